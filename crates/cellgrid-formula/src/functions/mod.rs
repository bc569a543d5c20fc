//! Built-in functions
//!
//! Functions are looked up by upper-case name in a [`FunctionRegistry`]. The
//! parser consults the registry so that unknown names and wrongly shaped
//! arguments are rejected before anything is evaluated; the evaluator then
//! calls the registered implementation with evaluated arguments.

pub mod aggregate;

use cellgrid_core::{CellValue, ErrorKind};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The registry of built-in functions
pub fn registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Shape of one declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// A range reference such as `A1:A3`
    Range,
    /// Any scalar expression
    Value,
}

/// An evaluated function argument
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArg {
    /// Member values of a range, in range order (blank members are blank text)
    Range(Vec<CellValue>),
    /// A scalar value
    Value(CellValue),
}

/// Function implementation signature
///
/// Arguments arrive in declaration order and already match the declared
/// [`Param`]s. Returning `Err(kind)` makes the calling formula `Error(kind)`.
pub type FunctionImpl = fn(&[FunctionArg]) -> Result<CellValue, ErrorKind>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Declared parameters; calls must supply exactly these
    pub params: &'static [Param],
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_aggregate_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function, replacing any previous definition with that name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_aggregate_functions(&mut self) {
        self.register(FunctionDef {
            name: "SUM",
            params: &[Param::Range],
            implementation: aggregate::fn_sum,
        });

        self.register(FunctionDef {
            name: "AVERAGE",
            params: &[Param::Range],
            implementation: aggregate::fn_average,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.get("sum").is_some());
        assert!(registry.get("Average").is_some());
        assert!(registry.get("MEDIAN").is_none());
        assert_eq!(registry.names(), vec!["AVERAGE", "SUM"]);
    }

    #[test]
    fn test_register_extends_registry() {
        fn fn_count(args: &[FunctionArg]) -> Result<CellValue, ErrorKind> {
            match args {
                [FunctionArg::Range(values)] => Ok(CellValue::Number(values.len() as f64)),
                _ => Err(ErrorKind::TypeMismatch),
            }
        }

        let mut registry = FunctionRegistry::new();
        registry.register(FunctionDef {
            name: "COUNT",
            params: &[Param::Range],
            implementation: fn_count,
        });

        let def = registry.get("count").unwrap();
        assert_eq!(def.params, &[Param::Range]);
        let result = (def.implementation)(&[FunctionArg::Range(vec![CellValue::blank(); 3])]);
        assert_eq!(result, Ok(CellValue::Number(3.0)));
    }
}
