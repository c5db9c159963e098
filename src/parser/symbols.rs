//! Two-tier symbol table
//!
//! Names live either in the module scope (global variables, global constants
//! and functions) or in the single active function scope (parameters and
//! locals). Functions never nest, so at most one function scope exists at a
//! time. Lookups search the function scope first, which is what lets a
//! parameter or local shadow a global of the same name.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::ast::SourceLocation;
use super::errors::ParseError;
use super::types::DataType;

/// How an identifier is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    GlobalMutable,
    GlobalConstant,
    Parameter,
    Local,
}

impl StorageClass {
    /// Parameters and locals are addressed through the function frame
    pub fn is_local(self) -> bool {
        matches!(self, StorageClass::Parameter | StorageClass::Local)
    }
}

/// A resolved declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub data_type: DataType,
    pub storage: StorageClass,
}

/// Signature of a declared function. `return_type` is `None` for `void`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub return_type: Option<DataType>,
    pub params: Vec<DataType>,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    globals: FxHashMap<String, Symbol>,
    functions: FxHashMap<String, FunctionSignature>,
    locals: Option<FxHashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn module_name_taken(&self, name: &str) -> bool {
        self.globals.contains_key(name) || self.functions.contains_key(name)
    }

    pub fn declare_global(
        &mut self,
        name: &str,
        data_type: DataType,
        is_const: bool,
        location: SourceLocation,
    ) -> Result<Symbol, ParseError> {
        if self.module_name_taken(name) {
            return Err(ParseError::DuplicateSymbol {
                name: name.to_string(),
                location,
            });
        }

        let storage = if is_const {
            StorageClass::GlobalConstant
        } else {
            StorageClass::GlobalMutable
        };
        let symbol = Symbol {
            name: name.to_string(),
            data_type,
            storage,
        };
        trace!(symbol = name, %data_type, ?storage, "declared global");
        self.globals.insert(name.to_string(), symbol.clone());
        Ok(symbol)
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        signature: FunctionSignature,
        location: SourceLocation,
    ) -> Result<(), ParseError> {
        if self.module_name_taken(name) {
            return Err(ParseError::DuplicateSymbol {
                name: name.to_string(),
                location,
            });
        }

        trace!(symbol = name, ?signature, "declared function");
        self.functions.insert(name.to_string(), signature);
        Ok(())
    }

    pub fn enter_function_scope(&mut self) {
        debug_assert!(self.locals.is_none(), "function scopes do not nest");
        self.locals = Some(FxHashMap::default());
    }

    pub fn exit_function_scope(&mut self) {
        self.locals = None;
    }

    pub fn declare_parameter(
        &mut self,
        name: &str,
        data_type: DataType,
        location: SourceLocation,
    ) -> Result<Symbol, ParseError> {
        self.declare_in_function(name, data_type, StorageClass::Parameter, location)
    }

    pub fn declare_local(
        &mut self,
        name: &str,
        data_type: DataType,
        location: SourceLocation,
    ) -> Result<Symbol, ParseError> {
        self.declare_in_function(name, data_type, StorageClass::Local, location)
    }

    fn declare_in_function(
        &mut self,
        name: &str,
        data_type: DataType,
        storage: StorageClass,
        location: SourceLocation,
    ) -> Result<Symbol, ParseError> {
        let Some(locals) = self.locals.as_mut() else {
            return Err(ParseError::Syntax {
                message: format!("'{}' declared outside of a function", name),
                location,
            });
        };

        if locals.contains_key(name) {
            return Err(ParseError::DuplicateSymbol {
                name: name.to_string(),
                location,
            });
        }

        let symbol = Symbol {
            name: name.to_string(),
            data_type,
            storage,
        };
        trace!(symbol = name, %data_type, ?storage, "declared in function scope");
        locals.insert(name.to_string(), symbol.clone());
        Ok(symbol)
    }

    /// Resolve a variable: function scope first, then module scope
    pub fn lookup(&self, name: &str, location: SourceLocation) -> Result<&Symbol, ParseError> {
        self.locals
            .as_ref()
            .and_then(|locals| locals.get(name))
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| ParseError::UndeclaredSymbol {
                name: name.to_string(),
                location,
            })
    }

    pub fn lookup_function(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<&FunctionSignature, ParseError> {
        self.functions
            .get(name)
            .ok_or_else(|| ParseError::UndeclaredSymbol {
                name: name.to_string(),
                location,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::errors::ErrorKind;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_global_lookup() {
        let mut table = SymbolTable::new();
        table.declare_global("bar", DataType::I32, false, loc()).unwrap();
        table.declare_global("pi", DataType::F64, true, loc()).unwrap();

        let bar = table.lookup("bar", loc()).unwrap();
        assert_eq!(bar.storage, StorageClass::GlobalMutable);
        assert_eq!(bar.data_type, DataType::I32);

        let pi = table.lookup("pi", loc()).unwrap();
        assert_eq!(pi.storage, StorageClass::GlobalConstant);
    }

    #[test]
    fn test_duplicate_global() {
        let mut table = SymbolTable::new();
        table.declare_global("x", DataType::I32, false, loc()).unwrap();
        let err = table
            .declare_global("x", DataType::F32, true, loc())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);
    }

    #[test]
    fn test_functions_share_module_namespace() {
        let mut table = SymbolTable::new();
        let sig = FunctionSignature {
            return_type: None,
            params: vec![],
        };
        table.declare_function("main", sig.clone(), loc()).unwrap();
        assert_eq!(
            table
                .declare_global("main", DataType::I32, false, loc())
                .unwrap_err()
                .kind(),
            ErrorKind::DuplicateSymbol
        );
        assert_eq!(
            table.declare_function("main", sig, loc()).unwrap_err().kind(),
            ErrorKind::DuplicateSymbol
        );
    }

    #[test]
    fn test_shadowing() {
        let mut table = SymbolTable::new();
        table.declare_global("bar", DataType::I32, false, loc()).unwrap();

        table.enter_function_scope();
        table.declare_parameter("bar", DataType::F64, loc()).unwrap();
        let bar = table.lookup("bar", loc()).unwrap();
        assert_eq!(bar.storage, StorageClass::Parameter);
        assert_eq!(bar.data_type, DataType::F64);
        table.exit_function_scope();

        let bar = table.lookup("bar", loc()).unwrap();
        assert_eq!(bar.storage, StorageClass::GlobalMutable);
    }

    #[test]
    fn test_duplicate_in_function_scope() {
        let mut table = SymbolTable::new();
        table.enter_function_scope();
        table.declare_parameter("a", DataType::I32, loc()).unwrap();
        let err = table.declare_local("a", DataType::I32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);
    }

    #[test]
    fn test_locals_do_not_outlive_function() {
        let mut table = SymbolTable::new();
        table.enter_function_scope();
        table.declare_local("tmp", DataType::I64, loc()).unwrap();
        table.exit_function_scope();

        let err = table.lookup("tmp", loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndeclaredSymbol);
    }

    #[test]
    fn test_local_outside_function() {
        let mut table = SymbolTable::new();
        let err = table.declare_local("x", DataType::I32, loc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
