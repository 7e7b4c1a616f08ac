use crate::logic::resolve;
use crate::model::{AttributeGroup, AttributeValue, Scope};

/// Bucket name for values whose attribute belongs to no effective group.
pub const UNGROUPED: &str = "Ungrouped";

#[derive(Debug, Clone, PartialEq)]
pub struct GroupBucket {
    pub name: String,
    pub values: Vec<AttributeValue>,
}

/// Display model: one bucket per effective group, in group-list order, plus
/// the always-present "Ungrouped" bucket at the end.
#[derive(Debug, Clone, Default)]
pub struct GroupedView {
    pub buckets: Vec<GroupBucket>,
}

impl GroupedView {
    pub fn bucket(&self, name: &str) -> Option<&GroupBucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    pub fn value_count(&self) -> usize {
        self.buckets.iter().map(|b| b.values.len()).sum()
    }
}

/// Assemble the grouped display model. Every input value lands in exactly one
/// bucket: the first group whose item list contains its attribute id, or
/// "Ungrouped" when no group claims it.
pub fn build_grouped_view(groups: &[AttributeGroup], values: &[AttributeValue]) -> GroupedView {
    let mut buckets: Vec<GroupBucket> = groups
        .iter()
        .map(|group| GroupBucket {
            name: group.name.clone(),
            values: Vec::new(),
        })
        .collect();
    buckets.push(GroupBucket {
        name: UNGROUPED.to_string(),
        values: Vec::new(),
    });

    for value in values {
        let slot = groups
            .iter()
            .position(|group| group.contains(&value.attribute_id))
            .unwrap_or(buckets.len() - 1);
        buckets[slot].values.push(value.clone());
    }

    GroupedView { buckets }
}

/// Groups from the effective list that have no attribute with a stored value
/// yet. These drive the "Add this group" bulk action.
pub fn missing_groups<'a>(
    groups: &'a [AttributeGroup],
    values: &[AttributeValue],
) -> Vec<&'a AttributeGroup> {
    groups
        .iter()
        .filter(|group| {
            !group
                .attribute_ids()
                .any(|id| values.iter().any(|v| v.attribute_id == id))
        })
        .collect()
}

/// Attribute ids listed by a group's items that have no stored value yet for
/// the current scope. These drive the "Add all attributes from group" bulk
/// action, one create call per id.
pub fn unused_attribute_ids(
    group: &AttributeGroup,
    values: &[AttributeValue],
    scope: &Scope,
) -> Vec<String> {
    group
        .attribute_ids()
        .filter(|id| resolve(values, id, scope).is_none())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupItem, ValueBody};
    use chrono::Utc;

    fn group(name: &str, attrs: &[&str]) -> AttributeGroup {
        AttributeGroup {
            id: format!("group-{}", name.to_lowercase()),
            name: name.to_string(),
            items: attrs
                .iter()
                .map(|a| GroupItem {
                    attribute_id: a.to_string(),
                })
                .collect(),
        }
    }

    fn value(id: &str, attribute: &str) -> AttributeValue {
        AttributeValue {
            id: id.to_string(),
            attribute_id: attribute.to_string(),
            body: ValueBody::Text {
                value: id.to_string(),
            },
            locale: None,
            channel: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn every_value_lands_in_exactly_one_bucket() {
        let groups = vec![group("Basics", &["name", "sku"]), group("Media", &["image"])];
        let values = vec![
            value("v1", "name"),
            value("v2", "image"),
            value("v3", "ean"), // claimed by no group
            value("v4", "sku"),
        ];
        let view = build_grouped_view(&groups, &values);

        assert_eq!(view.value_count(), values.len());
        assert_eq!(view.bucket("Basics").unwrap().values.len(), 2);
        assert_eq!(view.bucket("Media").unwrap().values.len(), 1);
        assert_eq!(view.bucket(UNGROUPED).unwrap().values.len(), 1);
        assert_eq!(view.bucket(UNGROUPED).unwrap().values[0].id, "v3");
    }

    #[test]
    fn ungrouped_bucket_exists_even_when_empty() {
        let view = build_grouped_view(&[], &[]);
        assert_eq!(view.buckets.len(), 1);
        assert_eq!(view.buckets[0].name, UNGROUPED);
        assert!(view.buckets[0].values.is_empty());
    }

    #[test]
    fn first_matching_group_claims_shared_attribute() {
        let groups = vec![group("A", &["shared"]), group("B", &["shared"])];
        let values = vec![value("v1", "shared")];
        let view = build_grouped_view(&groups, &values);
        assert_eq!(view.bucket("A").unwrap().values.len(), 1);
        assert!(view.bucket("B").unwrap().values.is_empty());
        assert_eq!(view.value_count(), 1);
    }

    #[test]
    fn missing_groups_reports_groups_with_no_values() {
        let groups = vec![group("Basics", &["name"]), group("Media", &["image"])];
        let values = vec![value("v1", "name")];
        let missing: Vec<_> = missing_groups(&groups, &values)
            .into_iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(missing, vec!["Media"]);
    }

    #[test]
    fn unused_ids_skip_attributes_with_any_value() {
        let g = group("Basics", &["name", "sku", "ean"]);
        let values = vec![value("v1", "sku")];
        let unused = unused_attribute_ids(&g, &values, &Scope::global());
        assert_eq!(unused, vec!["name".to_string(), "ean".to_string()]);
    }
}
