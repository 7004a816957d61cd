//! Macro names from design-database (DEF) files.
//!
//! The engine only needs the macro column of the `COMPONENTS` section, so
//! the default source scans for it instead of building a full object model.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::markup::compile_static_regex;

/// Yields the macro names used by a DEF file on disk.
pub trait MacroSource: Send + Sync {
    /// Returns the macro of every component, or `None` if the file has no
    /// usable component list.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read.
    fn macros(&self, def_path: &Path) -> io::Result<Option<Vec<String>>>;
}

static COMPONENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?ms)^\s*COMPONENTS\s+\d+\s*;(.*?)^\s*END\s+COMPONENTS\b")
});

/// Scans the `COMPONENTS ... END COMPONENTS` section of a DEF file.
///
/// Each statement has the form `- <instance> <macro> [+ ...] ;`. Macro
/// names are returned once each, in first-seen order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefComponents;

impl DefComponents {
    /// Parses component macros from DEF text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Vec<String>> {
        let section = COMPONENTS_RE.captures(text)?.get(1)?.as_str();
        let mut macros: Vec<String> = Vec::new();
        for statement in section.split(';') {
            let mut tokens = statement.split_whitespace();
            if tokens.next() != Some("-") {
                continue;
            }
            let (Some(_instance), Some(macro_name)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            if !macros.iter().any(|seen| seen == macro_name) {
                macros.push(macro_name.to_string());
            }
        }
        Some(macros)
    }
}

impl MacroSource for DefComponents {
    fn macros(&self, def_path: &Path) -> io::Result<Option<Vec<String>>> {
        let bytes = fs::read(def_path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPER_DEF: &str = "VERSION 5.8 ;\n\
        DESIGN user_project_wrapper ;\n\
        UNITS DISTANCE MICRONS 1000 ;\n\
        COMPONENTS 3 ;\n\
        - mprj user_proj_example + FIXED ( 1175 1690 ) N ;\n\
        - sram0 sky130_sram_1kbyte_1rw1r_32x256_8\n  + PLACED ( 100 100 ) N ;\n\
        - mprj2 user_proj_example + FIXED ( 5000 1690 ) N ;\n\
        END COMPONENTS\n\
        PINS 2 ;\n\
        - io_in[0] + NET io_in[0] ;\n\
        END PINS\n\
        END DESIGN\n";

    #[test]
    fn test_parse_lists_unique_macros_in_order() {
        assert_eq!(
            DefComponents::parse(WRAPPER_DEF),
            Some(vec![
                "user_proj_example".to_string(),
                "sky130_sram_1kbyte_1rw1r_32x256_8".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_without_components_section_is_none() {
        assert_eq!(DefComponents::parse("VERSION 5.8 ;\nEND DESIGN\n"), None);
    }

    #[test]
    fn test_parse_empty_components_section_is_empty_list() {
        let def = "COMPONENTS 0 ;\nEND COMPONENTS\n";
        assert_eq!(DefComponents::parse(def), Some(Vec::new()));
    }

    #[test]
    fn test_macros_reads_from_disk() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        fs::write(temp.path(), WRAPPER_DEF).unwrap();
        let macros = DefComponents.macros(temp.path()).unwrap().unwrap();
        assert_eq!(macros.len(), 2);
    }
}
