//! Read-only lookup table of remote functions

use nvim_http_core::{ApiInfo, FunctionInfo};
use std::collections::HashMap;
use tracing::warn;

/// Remote functions indexed by name. Built once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct ProcedureTable {
    functions: HashMap<String, FunctionInfo>,
}

impl ProcedureTable {
    /// Index the functions of an API-info snapshot
    pub fn from_api_info(info: &ApiInfo) -> Self {
        let mut functions = HashMap::with_capacity(info.functions.len());
        for function in &info.functions {
            if functions.insert(function.name.clone(), function.clone()).is_some() {
                warn!("Duplicate function in API info: {}", function.name);
            }
        }
        Self { functions }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let info = ApiInfo::new(vec![
            FunctionInfo::new("nvim_get_var", ["name"]),
            FunctionInfo::new("nvim_buf_get_name", ["buffer"]),
        ]);
        let table = ProcedureTable::from_api_info(&info);

        assert_eq!(table.len(), 2);
        assert!(table.contains("nvim_get_var"));
        assert_eq!(
            table.get("nvim_buf_get_name").unwrap().parameter_names().collect::<Vec<_>>(),
            vec!["buffer"]
        );
        assert!(table.get("nvim_get_nothing").is_none());
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let info = ApiInfo::new(vec![
            FunctionInfo::new("nvim_input", ["keys"]),
            FunctionInfo::new("nvim_input", ["keys", "extra"]),
        ]);
        let table = ProcedureTable::from_api_info(&info);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("nvim_input").unwrap().parameters.len(), 2);
    }
}
