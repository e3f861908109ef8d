//! Column type names and their aliases.
//!
//! Declared column types come from many writers: pandas dtypes, Spark SQL
//! type classes, SQL DDL. Before comparing a declared type with the type a
//! rule expects, both sides are folded onto one canonical name.

/// Folds a declared type name onto its canonical form.
///
/// Unknown names are lowercased and trimmed, so two spellings of an unknown
/// type still compare equal.
///
/// ```rust
/// use quality_validator::normalize_type;
///
/// assert_eq!(normalize_type("StringType"), "string");
/// assert_eq!(normalize_type(" VARCHAR "), "string");
/// assert_eq!(normalize_type("LongType"), "int64");
/// assert_eq!(normalize_type("decimal(10,2)"), "decimal");
/// ```
pub fn normalize_type(type_str: &str) -> String {
    let lowered = type_str.trim().to_lowercase();

    // Parameterized types compare on their base name.
    let base = match lowered.split_once(['(', '<']) {
        Some((base, _)) => base.trim(),
        None => lowered.as_str(),
    };

    let canonical = match base {
        "string" | "stringtype" | "str" | "object" | "varchar" | "char" | "text" => "string",
        "int" | "integer" | "int32" | "integertype" => "int32",
        "long" | "bigint" | "int64" | "longtype" => "int64",
        "short" | "smallint" | "int16" | "shorttype" => "int16",
        "byte" | "tinyint" | "int8" | "bytetype" => "int8",
        "float" | "real" | "float32" | "floattype" => "float32",
        "double" | "float64" | "doubletype" => "float64",
        "bool" | "boolean" | "booleantype" => "boolean",
        "timestamp" | "datetime" | "datetime64" | "datetime64[ns]" | "timestamptype" => {
            "timestamp"
        }
        "date" | "datetype" => "date",
        "decimal" | "numeric" | "decimaltype" => "decimal",
        "binary" | "bytes" | "binarytype" => "binary",
        "array" | "list" | "arraytype" => "list",
        "map" | "maptype" => "map",
        "struct" | "structtype" => "struct",
        other => other,
    };

    canonical.to_string()
}

/// Returns true when two type names denote the same canonical type.
pub fn same_type(declared: &str, expected: &str) -> bool {
    normalize_type(declared) == normalize_type(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spark_names() {
        assert_eq!(normalize_type("StringType"), "string");
        assert_eq!(normalize_type("IntegerType"), "int32");
        assert_eq!(normalize_type("DoubleType"), "float64");
        assert_eq!(normalize_type("TimestampType"), "timestamp");
        assert_eq!(normalize_type("DateType"), "date");
    }

    #[test]
    fn test_parameterized_types() {
        assert_eq!(normalize_type("varchar(255)"), "string");
        assert_eq!(normalize_type("array<string>"), "list");
        assert_eq!(normalize_type("map<string,int>"), "map");
    }

    #[test]
    fn test_same_type() {
        assert!(same_type("str", "StringType"));
        assert!(same_type("bigint", "int64"));
        assert!(!same_type("int32", "int64"));
        assert!(same_type("Geography", "geography"));
    }
}
