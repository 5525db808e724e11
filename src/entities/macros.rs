//! Macros for reducing boilerplate when defining entities

/// Define an audited catalog record and implement [`Entity`](crate::core::entity::Entity) for it
///
/// The generated struct embeds an [`AuditedEntity`](crate::core::entity::AuditedEntity)
/// as `audit`, flattened on the wire, followed by the declared fields.
///
/// # Example
///
/// ```rust,ignore
/// impl_audited_entity!(
///     /// A storefront listed in the catalog
///     Shop, "shop", "shops", "shop",
///     {
///         pub title: String,
///         pub rating: Option<f64>,
///     }
/// );
/// ```
#[macro_export]
macro_rules! impl_audited_entity {
    (
        $(#[$meta:meta])*
        $type:ident, $singular:literal, $plural:literal, $table:literal,
        {
            $(
                $(#[$field_meta:meta])*
                $vis:vis $field:ident : $field_type:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            #[serde(flatten)]
            pub audit: $crate::core::entity::AuditedEntity,

            $(
                $(#[$field_meta])*
                $vis $field: $field_type,
            )*
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn table_name() -> &'static str {
                $table
            }

            fn audit(&self) -> &$crate::core::entity::AuditedEntity {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::core::entity::AuditedEntity {
                &mut self.audit
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::entity::{AuditedEntity, Entity};
    use chrono::Utc;

    crate::impl_audited_entity!(
        /// Minimal record used to exercise the macro
        Widget, "widget", "widgets", "widget",
        {
            pub label: String,
            #[serde(default)]
            pub weight: Option<u32>,
        }
    );

    #[test]
    fn test_macro_metadata() {
        assert_eq!(Widget::resource_name(), "widgets");
        assert_eq!(Widget::resource_name_singular(), "widget");
        assert_eq!(Widget::table_name(), "widget");
    }

    #[test]
    fn test_macro_flattens_audit_fields() {
        let widget = Widget {
            audit: AuditedEntity::new(Utc::now()),
            label: "gear".to_string(),
            weight: None,
        };
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["id"], widget.id().to_string());
        assert!(json.get("created").is_some());
        assert!(json.get("audit").is_none());
        assert_eq!(json["label"], "gear");

        let back: Widget = serde_json::from_value(json).unwrap();
        assert_eq!(back, widget);
    }
}
