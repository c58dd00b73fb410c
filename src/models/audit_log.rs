//! Declarative description of the two audit-log entry shapes.
//!
//! Each variant is a table of field rules plus the stored procedures that
//! accept it. Validation walks the tables in declaration order and the
//! binder follows `bind_order` (insert) or the parameter order (search), so
//! the positional contract of every procedure lives in exactly one place.

use serde_json::Value as JsonValue;

use crate::utils::validation::{validate_datetime, validate_integer, validate_string, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    A,
    B,
}

impl SchemaVariant {
    pub fn schema(self) -> &'static AuditSchema {
        match self {
            SchemaVariant::A => &VARIANT_A,
            SchemaVariant::B => &VARIANT_B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text { max_length: usize, allow_empty: bool },
    Integer { min: Option<i64> },
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldRule {
    const fn text(name: &'static str, max_length: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text {
                max_length,
                allow_empty: false,
            },
        }
    }

    const fn text_or_empty(name: &'static str, max_length: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text {
                max_length,
                allow_empty: true,
            },
        }
    }

    const fn integer(name: &'static str, min: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min: Some(min) },
        }
    }

    const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Timestamp,
        }
    }

    pub fn check(&self, value: &JsonValue) -> Verdict {
        match self.kind {
            FieldKind::Text {
                max_length,
                allow_empty,
            } => validate_string(value, self.name, max_length, allow_empty),
            FieldKind::Integer { min } => validate_integer(value, self.name, min),
            FieldKind::Timestamp => validate_datetime(value, self.name),
        }
    }
}

pub struct InsertSchema {
    pub procedure: &'static str,
    pub required: &'static [FieldRule],
    pub optional: &'static [FieldRule],
    pub bind_order: &'static [&'static str],
}

impl InsertSchema {
    pub fn rule(&self, name: &str) -> Option<&'static FieldRule> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|rule| rule.name == name)
    }
}

/// What a search parameter becomes when the query string leaves it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Value(&'static str),
    /// Bound as SQL NULL.
    Null,
    StartOfYear,
    Now,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchParam {
    pub rule: FieldRule,
    pub fallback: Fallback,
}

impl SearchParam {
    const fn text(name: &'static str, max_length: usize) -> Self {
        Self {
            rule: FieldRule::text_or_empty(name, max_length),
            fallback: Fallback::Value(""),
        }
    }

    const fn page(name: &'static str, default: &'static str) -> Self {
        Self {
            rule: FieldRule::integer(name, 1),
            fallback: Fallback::Value(default),
        }
    }

    const fn timestamp(name: &'static str, fallback: Fallback) -> Self {
        Self {
            rule: FieldRule::timestamp(name),
            fallback,
        }
    }
}

/// Total count reported when the procedure returns no secondary result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountFallback {
    RowCount,
    Zero,
}

pub struct SearchSchema {
    pub procedure: &'static str,
    /// Validation and binding order.
    pub params: &'static [SearchParam],
    pub page_number: &'static str,
    pub page_size: &'static str,
    pub count_fallback: CountFallback,
}

pub struct AuditSchema {
    pub insert: InsertSchema,
    pub search: SearchSchema,
}

pub static VARIANT_A: AuditSchema = AuditSchema {
    insert: InsertSchema {
        procedure: "USP_MES_InsertAuditLog",
        required: &[
            FieldRule::text("ActionCode", 50),
            FieldRule::text("Changes", 1_000_000),
            FieldRule::text("ErrorCode", 50),
            FieldRule::text("Euser", 25),
        ],
        optional: &[
            FieldRule::text_or_empty("CaseID", 50),
            FieldRule::text_or_empty("Operation", 50),
            FieldRule::text_or_empty("AssetCode", 40),
            FieldRule::text_or_empty("PlantCode", 50),
        ],
        bind_order: &[
            "ActionCode",
            "Changes",
            "ErrorCode",
            "CaseID",
            "Operation",
            "AssetCode",
            "PlantCode",
            "Euser",
        ],
    },
    search: SearchSchema {
        procedure: "USP_MES_GetAuditLog",
        params: &[
            SearchParam::text("SearchString", 500),
            SearchParam::timestamp("FromDate", Fallback::StartOfYear),
            SearchParam::timestamp("ToDate", Fallback::Now),
            SearchParam::page("PageNumber", "1"),
            SearchParam::page("PageSize", "50"),
            SearchParam::text("ShowErrorOnly", 1),
            SearchParam::text("CaseID", 50),
            SearchParam::text("Operation", 50),
            SearchParam::text("ActionCode", 50),
            SearchParam::text("Euser", 50),
            SearchParam::text("PlantCode", 50),
        ],
        page_number: "PageNumber",
        page_size: "PageSize",
        count_fallback: CountFallback::RowCount,
    },
};

pub static VARIANT_B: AuditSchema = AuditSchema {
    insert: InsertSchema {
        procedure: "USP_MES_InsertModuleAuditLog",
        required: &[
            FieldRule::integer("ModuleID", 1),
            FieldRule::text("AccessCode", 40),
            FieldRule::text("ActionDesc", 100),
            FieldRule::text("Changes", 1_000_000),
            FieldRule::text("ErrorCode", 50),
            FieldRule::text("PlantList", 100),
            FieldRule::text("Euser", 25),
        ],
        optional: &[
            FieldRule::text_or_empty("CaseID", 50),
            FieldRule::text_or_empty("Operation", 50),
            FieldRule::text_or_empty("AssetCode", 40),
            FieldRule::text_or_empty("Parameter1", 50),
            FieldRule::text_or_empty("Parameter2", 50),
            FieldRule::text_or_empty("Parameter3", 50),
            FieldRule::text_or_empty("Parameter4", 50),
        ],
        bind_order: &[
            "ModuleID",
            "AccessCode",
            "ActionDesc",
            "Changes",
            "ErrorCode",
            "PlantList",
            "Euser",
            "CaseID",
            "Operation",
            "AssetCode",
            "Parameter1",
            "Parameter2",
            "Parameter3",
            "Parameter4",
        ],
    },
    search: SearchSchema {
        procedure: "USP_MES_GetModuleAuditLog",
        params: &[
            SearchParam {
                rule: FieldRule::integer("ModuleID", 0),
                fallback: Fallback::Null,
            },
            SearchParam::text("Text", 500),
            SearchParam::timestamp("FromDate", Fallback::StartOfYear),
            SearchParam::timestamp("ToDate", Fallback::Now),
            SearchParam::page("PageNumber", "1"),
            SearchParam::page("PageSize", "50"),
            SearchParam::text("Euser", 50),
            SearchParam::text("Err", 1),
            SearchParam::text("PlantList", 100),
            SearchParam::text("CaseID", 50),
            SearchParam::text("Operation", 50),
            SearchParam::text("ActionDesc", 100),
        ],
        page_number: "PageNumber",
        page_size: "PageSize",
        count_fallback: CountFallback::Zero,
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn every_insert_field_is_bound_once(schema: &InsertSchema) {
        let declared = schema.required.len() + schema.optional.len();
        assert_eq!(schema.bind_order.len(), declared);
        for name in schema.bind_order {
            assert!(schema.rule(name).is_some(), "{} has no rule", name);
            let hits = schema.bind_order.iter().filter(|n| *n == name).count();
            assert_eq!(hits, 1, "{} bound more than once", name);
        }
    }

    #[test]
    fn insert_tables_cover_their_bind_order() {
        every_insert_field_is_bound_once(&VARIANT_A.insert);
        every_insert_field_is_bound_once(&VARIANT_B.insert);
    }

    #[test]
    fn search_parameter_order_matches_procedures() {
        let names = |s: &SearchSchema| s.params.iter().map(|p| p.rule.name).collect::<Vec<_>>();
        assert_eq!(
            names(&VARIANT_A.search),
            [
                "SearchString", "FromDate", "ToDate", "PageNumber", "PageSize",
                "ShowErrorOnly", "CaseID", "Operation", "ActionCode", "Euser", "PlantCode",
            ]
        );
        assert_eq!(
            names(&VARIANT_B.search),
            [
                "ModuleID", "Text", "FromDate", "ToDate", "PageNumber", "PageSize", "Euser",
                "Err", "PlantList", "CaseID", "Operation", "ActionDesc",
            ]
        );
    }

    #[test]
    fn rule_check_dispatches_on_kind() {
        let module = VARIANT_B.insert.rule("ModuleID").unwrap();
        assert_eq!(module.check(&json!(0)).unwrap_err(), "ModuleID must be at least 1");
        assert!(module.check(&json!("7")).is_ok());

        let plant = VARIANT_A.insert.rule("PlantCode").unwrap();
        assert!(plant.check(&json!("")).is_ok());
    }

    #[test]
    fn variants_resolve_to_their_tables() {
        assert_eq!(SchemaVariant::A.schema().insert.procedure, "USP_MES_InsertAuditLog");
        assert_eq!(SchemaVariant::B.schema().search.count_fallback, CountFallback::Zero);
    }
}
