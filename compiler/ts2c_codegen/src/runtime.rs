//! The C runtime: includes, container macros and string helpers.
//!
//! Everything here is an ordinary [`Header`]; lowering requires what it
//! uses by key and only those pieces reach the output.

use std::rc::Rc;

use ts2c_types::{NativeType, Primitive, StructType};

use crate::ctype::{c_type, declaration, pointer_to, type_tag};
use crate::registry::{Header, HeaderCx, HeaderRegistry};

/// Header keys of the runtime.
pub mod keys {
    pub const STDIO: &str = "stdio";
    pub const STDLIB: &str = "stdlib";
    pub const STRING: &str = "string";
    pub const STDINT: &str = "stdint";
    pub const ASSERT: &str = "assert";
    pub const BOOL: &str = "bool";
    pub const MATH: &str = "math";
    pub const ARRAY: &str = "array";
    pub const DICT: &str = "dict";
    pub const JS_VAR: &str = "js_var";
    pub const STR_INT16_T_CMP: &str = "str_int16_t_cmp";
    pub const STR_INT16_T_CAT: &str = "str_int16_t_cat";
    pub const STR_FLOAT_CAT: &str = "str_float_cat";
    pub const STR_POS: &str = "str_pos";
    pub const STR_CHAR_AT: &str = "str_char_at";
    pub const STR_SUBSTRING: &str = "str_substring";
    pub const STR_SPLIT: &str = "str_split";
}

/// A fixed block of text with fixed dependencies.
#[derive(Copy, Clone)]
pub struct StaticHeader {
    key: &'static str,
    text: &'static str,
    requires: &'static [&'static str],
}

impl StaticHeader {
    pub const fn new(
        key: &'static str,
        text: &'static str,
        requires: &'static [&'static str],
    ) -> Self {
        StaticHeader {
            key,
            text,
            requires,
        }
    }
}

impl Header for StaticHeader {
    fn type_key(&self) -> &str {
        self.key
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        for key in self.requires {
            cx.require(key);
        }
        self.text.to_string()
    }
}

/// `struct array_<tag>` for one element type.
pub struct ArrayStructHeader {
    key: String,
    element: NativeType,
}

impl ArrayStructHeader {
    pub fn new(element: &NativeType) -> Self {
        ArrayStructHeader {
            key: format!("array_{}", type_tag(element)),
            element: element.clone(),
        }
    }
}

impl Header for ArrayStructHeader {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        cx.require(keys::STDINT);
        for dependency in type_dependencies(&self.element) {
            dependency.add_to(cx);
        }
        format!(
            "struct {} {{\n    int16_t size;\n    int16_t capacity;\n    {}data;\n}};",
            self.key,
            pointer_to(&c_type(&self.element)),
        )
    }
}

/// `struct dict_<tag>`: sorted keys plus parallel values.
pub struct DictStructHeader {
    key: String,
    element: NativeType,
}

impl DictStructHeader {
    pub fn new(element: &NativeType) -> Self {
        DictStructHeader {
            key: format!("dict_{}", type_tag(element)),
            element: element.clone(),
        }
    }
}

impl Header for DictStructHeader {
    fn type_key(&self) -> &str {
        &self.key
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        let keys = ArrayStructHeader::new(&NativeType::STR);
        let values = ArrayStructHeader::new(&self.element);
        let text = format!(
            "struct {} {{\n    struct {} *index;\n    struct {} *values;\n}};",
            self.key,
            keys.type_key(),
            values.type_key(),
        );
        cx.declare(Rc::new(keys));
        cx.declare(Rc::new(values));
        text
    }
}

/// Definition of a named struct.
pub struct StructHeader {
    shape: StructType,
}

impl StructHeader {
    pub fn new(shape: &StructType) -> Self {
        StructHeader {
            shape: shape.clone(),
        }
    }
}

impl Header for StructHeader {
    fn type_key(&self) -> &str {
        &self.shape.name
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        let mut text = format!("struct {} {{\n", self.shape.name);
        if self.shape.fields.is_empty() {
            cx.require(keys::STDINT);
            text.push_str("    uint8_t unused;\n");
        }
        for (field, ty) in &self.shape.fields {
            for dependency in type_dependencies(ty) {
                dependency.add_to(cx);
            }
            text.push_str(&format!("    {};\n", declaration(ty, field)));
        }
        text.push_str("};");
        text
    }
}

/// Something a type needs defined before it can be spelled.
pub enum TypeDependency {
    Key(&'static str),
    Header(Rc<dyn Header>),
}

impl TypeDependency {
    pub fn add_to(self, cx: &mut HeaderCx) {
        match self {
            TypeDependency::Key(key) => cx.require(key),
            TypeDependency::Header(header) => cx.declare(header),
        }
    }
}

/// Headers defining the pieces of `ty`.
pub fn type_dependencies(ty: &NativeType) -> Vec<TypeDependency> {
    match ty {
        NativeType::Primitive(p) => match p {
            Primitive::Int | Primitive::Long | Primitive::Bool => {
                vec![TypeDependency::Key(keys::STDINT)]
            }
            Primitive::Boxed => vec![TypeDependency::Key(keys::JS_VAR)],
            _ => Vec::new(),
        },
        NativeType::Array(a) if a.dynamic => {
            vec![TypeDependency::Header(Rc::new(ArrayStructHeader::new(
                &a.element,
            )))]
        }
        NativeType::Array(a) => type_dependencies(&a.element),
        NativeType::Dict(element) => {
            vec![TypeDependency::Header(Rc::new(DictStructHeader::new(element)))]
        }
        NativeType::Struct(shape) => {
            vec![TypeDependency::Header(Rc::new(StructHeader::new(shape)))]
        }
    }
}

/// `str_split` pushes into a `struct array_string`.
struct StrSplitHeader;

impl Header for StrSplitHeader {
    fn type_key(&self) -> &str {
        keys::STR_SPLIT
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        cx.require(keys::ARRAY);
        cx.require(keys::STRING);
        cx.declare(Rc::new(ArrayStructHeader::new(&NativeType::STR)));
        STR_SPLIT.to_string()
    }
}

/// Register the runtime in `registry`.
pub fn register_standard(registry: &mut HeaderRegistry) {
    const STATIC: &[StaticHeader] = &[
        StaticHeader::new(keys::STDIO, "#include <stdio.h>", &[]),
        StaticHeader::new(keys::STDLIB, "#include <stdlib.h>", &[]),
        StaticHeader::new(keys::STRING, "#include <string.h>", &[]),
        StaticHeader::new(keys::STDINT, "#include <stdint.h>", &[]),
        StaticHeader::new(keys::ASSERT, "#include <assert.h>", &[]),
        StaticHeader::new(keys::MATH, "#include <math.h>", &[]),
        StaticHeader::new(keys::BOOL, "#define TRUE 1\n#define FALSE 0", &[]),
        StaticHeader::new(
            keys::ARRAY,
            ARRAY_MACROS,
            &[keys::STDLIB, keys::STRING, keys::ASSERT, keys::STDINT],
        ),
        StaticHeader::new(keys::DICT, DICT_MACROS, &[keys::ARRAY, keys::STRING]),
        StaticHeader::new(keys::JS_VAR, JS_VAR, &[keys::STDINT]),
        StaticHeader::new(
            keys::STR_INT16_T_CAT,
            STR_INT16_T_CAT,
            &[keys::STRING, keys::STDINT],
        ),
        StaticHeader::new(
            keys::STR_INT16_T_CMP,
            STR_INT16_T_CMP,
            &[keys::STR_INT16_T_CAT],
        ),
        StaticHeader::new(keys::STR_FLOAT_CAT, STR_FLOAT_CAT, &[keys::STR_INT16_T_CAT]),
        StaticHeader::new(keys::STR_POS, STR_POS, &[keys::STRING, keys::STDINT]),
        StaticHeader::new(
            keys::STR_CHAR_AT,
            STR_CHAR_AT,
            &[keys::STDLIB, keys::STRING, keys::ASSERT, keys::STDINT],
        ),
        StaticHeader::new(
            keys::STR_SUBSTRING,
            STR_SUBSTRING,
            &[keys::STDLIB, keys::STRING, keys::ASSERT, keys::STDINT],
        ),
    ];

    for header in STATIC {
        registry.register(Rc::new(*header));
    }
    registry.register(Rc::new(StrSplitHeader));
}

const ARRAY_MACROS: &str = r"#define ARRAY_CREATE(array, init_capacity, init_size) { \
    array = malloc(sizeof(*array)); \
    assert(array != NULL); \
    array->data = malloc((init_capacity) * sizeof(*array->data)); \
    assert(array->data != NULL); \
    array->capacity = init_capacity; \
    array->size = init_size; \
}
#define ARRAY_PUSH(array, item) { \
    if (array->size == array->capacity) { \
        array->capacity = array->capacity ? array->capacity * 2 : 2; \
        array->data = realloc(array->data, array->capacity * sizeof(*array->data)); \
        assert(array->data != NULL); \
    } \
    array->data[array->size++] = item; \
}
#define ARRAY_POP(array) (array->size != 0 ? array->data[--array->size] : 0)
#define ARRAY_INSERT(array, pos, item) { \
    ARRAY_PUSH(array, item); \
    if ((pos) < array->size - 1) { \
        memmove(&(array->data[(pos) + 1]), &(array->data[pos]), (array->size - (pos) - 1) * sizeof(*array->data)); \
        array->data[pos] = item; \
    } \
}
#define ARRAY_REMOVE(array, pos, num) { \
    memmove(&(array->data[pos]), &(array->data[(pos) + (num)]), (array->size - (pos) - (num)) * sizeof(*array->data)); \
    array->size -= num; \
}
#define ARRAY_FREE(array) { \
    if (array) { \
        free((array)->data); \
        free(array); \
    } \
}
#define ARRAY_FREE_CONTENTS(array) { \
    if (array) { \
        int16_t array_free_i; \
        for (array_free_i = 0; array_free_i < (array)->size; array_free_i++) \
            free((void *)(array)->data[array_free_i]); \
        ARRAY_FREE(array); \
    } \
}";

const DICT_MACROS: &str = r"int16_t dict_find_pos(const char ** keys, int16_t keys_size, const char * key) {
    int16_t low = 0;
    int16_t high = keys_size - 1;
    int16_t mid;
    int result;

    if (keys_size == 0 || key == NULL)
        return -1;

    while (low <= high) {
        mid = (low + high) / 2;
        result = strcmp(keys[mid], key);
        if (result == 0)
            return mid;
        if (result < 0)
            low = mid + 1;
        else
            high = mid - 1;
    }

    return -1 - low;
}

int16_t tmp_dict_pos;
#define DICT_GET(dict, prop, default) ((tmp_dict_pos = dict_find_pos((dict)->index->data, (dict)->index->size, prop)) < 0 ? default : (dict)->values->data[tmp_dict_pos])

int16_t tmp_dict_pos2;
#define DICT_SET(dict, prop, value) { \
    tmp_dict_pos2 = dict_find_pos((dict)->index->data, (dict)->index->size, prop); \
    if (tmp_dict_pos2 < 0) { \
        tmp_dict_pos2 = -tmp_dict_pos2 - 1; \
        ARRAY_INSERT((dict)->index, tmp_dict_pos2, prop); \
        ARRAY_INSERT((dict)->values, tmp_dict_pos2, value); \
    } else \
        (dict)->values->data[tmp_dict_pos2] = value; \
}
#define DICT_CREATE(dict, init_capacity) { \
    dict = malloc(sizeof(*dict)); \
    assert(dict != NULL); \
    ARRAY_CREATE(dict->index, init_capacity, 0); \
    ARRAY_CREATE(dict->values, init_capacity, 0); \
}
#define DICT_FREE(dict) { \
    if (dict) { \
        ARRAY_FREE((dict)->index); \
        ARRAY_FREE((dict)->values); \
        free(dict); \
    } \
}";

const JS_VAR: &str = "struct js_var {
    int16_t type;
    int16_t number;
    const char * string;
};";

const STR_INT16_T_CAT: &str = r"#define STR_INT16_T_BUFLEN 12

void str_int16_t_cat(char * str, int32_t num) {
    char buf[STR_INT16_T_BUFLEN];
    int16_t i = STR_INT16_T_BUFLEN - 1;
    int32_t rest = num < 0 ? -num : num;

    buf[i] = '\0';
    do {
        buf[--i] = '0' + rest % 10;
        rest /= 10;
    } while (rest > 0);
    if (num < 0)
        buf[--i] = '-';
    strcat(str, buf + i);
}";

const STR_INT16_T_CMP: &str = r"int str_int16_t_cmp(const char * str, int32_t num) {
    char numstr[STR_INT16_T_BUFLEN];

    numstr[0] = '\0';
    str_int16_t_cat(numstr, num);
    return strcmp(str, numstr);
}";

const STR_FLOAT_CAT: &str = r#"#define STR_FLOAT_BUFLEN 24

void str_float_cat(char * str, float num) {
    int32_t whole;
    int32_t fraction;
    int32_t digits;

    if (num < 0) {
        strcat(str, "-");
        num = -num;
    }
    whole = (int32_t)num;
    fraction = (int32_t)((num - whole) * 1000000.0f + 0.5f);
    if (fraction >= 1000000) {
        whole++;
        fraction -= 1000000;
    }
    str_int16_t_cat(str, whole);
    strcat(str, ".");
    for (digits = 100000; digits > fraction && digits > 1; digits /= 10)
        strcat(str, "0");
    str_int16_t_cat(str, fraction);
}"#;

const STR_POS: &str = r"int16_t str_pos(const char * str, const char * search) {
    const char * found = strstr(str, search);
    return found ? (int16_t)(found - str) : -1;
}";

const STR_CHAR_AT: &str = r"char * str_char_at(const char * str, int16_t pos) {
    char * result = malloc(2);
    assert(result != NULL);
    result[0] = pos >= 0 && pos < (int16_t)strlen(str) ? str[pos] : '\0';
    result[1] = '\0';
    return result;
}";

const STR_SUBSTRING: &str = r"char * str_substring(const char * str, int16_t start, int16_t end) {
    int16_t len = strlen(str);
    int16_t tmp;
    char * result;

    if (start < 0)
        start = 0;
    if (end < 0)
        end = 0;
    if (start > len)
        start = len;
    if (end > len)
        end = len;
    if (start > end) {
        tmp = start;
        start = end;
        end = tmp;
    }
    result = malloc(end - start + 1);
    assert(result != NULL);
    strncpy(result, str + start, end - start);
    result[end - start] = '\0';
    return result;
}";

const STR_SPLIT: &str = r"void str_split(struct array_string * result, const char * str, const char * separator) {
    int16_t sep_len = strlen(separator);
    const char * start = str;
    const char * found;
    char * piece;

    while (sep_len > 0 && (found = strstr(start, separator)) != NULL) {
        piece = malloc(found - start + 1);
        assert(piece != NULL);
        strncpy(piece, start, found - start);
        piece[found - start] = '\0';
        ARRAY_PUSH(result, piece);
        start = found + sep_len;
    }
    piece = malloc(strlen(start) + 1);
    assert(piece != NULL);
    strcpy(piece, start);
    ARRAY_PUSH(result, piece);
}";
