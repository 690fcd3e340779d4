//! Final inference results.

use ts2c_ir::NodeId;

use crate::{NativeType, StructType, SymbolTable, TypeOverrides, TypeQuery, VarId, VariableInfo};

static UNKNOWN: NativeType = NativeType::POINTER;

/// How an object-typed variable is represented, decided once at the end of
/// inference.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ObjectRepr {
    /// Closed key set: a C struct.
    Struct,
    /// Open key set: a sorted string-keyed map.
    Dict,
}

/// Variables, expression types and named structs of one program.
#[derive(Clone, Debug)]
pub struct TypeTable {
    symbols: SymbolTable,
    node_types: Vec<NativeType>,
    overrides: TypeOverrides,
    /// Distinct struct shapes, inner structs before the structs using them.
    structs: Vec<StructType>,
}

impl TypeTable {
    pub(crate) fn new(
        mut symbols: SymbolTable,
        mut node_types: Vec<NativeType>,
        overrides: TypeOverrides,
    ) -> Self {
        let mut structs = StructNames::default();

        let vars: Vec<VarId> = symbols.vars().map(|(id, _)| id).collect();
        for var in vars {
            let info = symbols.var_mut(var);
            let hint = info.c_name.clone();
            structs.name_all(&mut info.ty, &hint);
            info.requires_allocation = info.ty.is_heap_container();
        }
        for ty in &mut node_types {
            structs.name_all(ty, "obj");
        }

        TypeTable {
            symbols,
            node_types,
            overrides,
            structs: structs.registry,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn var(&self, var: VarId) -> &VariableInfo {
        self.symbols.var(var)
    }

    pub fn var_type(&self, var: VarId) -> &NativeType {
        &self.symbols.var(var).ty
    }

    /// Type of any node; statements are `void`.
    pub fn type_of(&self, node: NodeId) -> &NativeType {
        self.node_types
            .get(node.index())
            .unwrap_or(&UNKNOWN)
    }

    pub fn overrides(&self) -> &TypeOverrides {
        &self.overrides
    }

    /// Every named struct, dependencies first.
    pub fn structs(&self) -> &[StructType] {
        &self.structs
    }

    pub fn object_repr(&self, var: VarId) -> Option<ObjectRepr> {
        match self.var_type(var) {
            NativeType::Struct(_) => Some(ObjectRepr::Struct),
            NativeType::Dict(_) => Some(ObjectRepr::Dict),
            _ => None,
        }
    }
}

impl TypeQuery for TypeTable {
    fn node_type(&self, node: NodeId) -> NativeType {
        self.type_of(node).clone()
    }
}

/// Gives each distinct struct shape one C tag.
#[derive(Default)]
struct StructNames {
    registry: Vec<StructType>,
}

impl StructNames {
    /// Name every struct inside `ty`, innermost first.
    fn name_all(&mut self, ty: &mut NativeType, hint: &str) {
        match ty {
            NativeType::Primitive(_) => {}
            NativeType::Array(a) => self.name_all(&mut a.element, hint),
            NativeType::Dict(e) => self.name_all(e, hint),
            NativeType::Struct(s) => {
                for (field, field_ty) in &mut s.fields {
                    self.name_all(field_ty, &format!("{hint}_{field}"));
                }
                let name = self.name_of(s, hint);
                s.name = name;
            }
        }
    }

    fn name_of(&mut self, shape: &StructType, hint: &str) -> String {
        if let Some(known) = self.registry.iter().find(|s| *s == shape) {
            return known.name.clone();
        }
        let mut name = format!("{hint}_t");
        let mut n = 2;
        while self.registry.iter().any(|s| s.name == name) {
            name = format!("{hint}_{n}_t");
            n += 1;
        }
        self.registry.push(StructType {
            name: name.clone(),
            fields: shape.fields.clone(),
        });
        name
    }
}
