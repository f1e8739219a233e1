use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, CategoryRef};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Absent keeps the parent, `null` detaches the category to the root.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    pub active: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetail {
    pub category: Category,
    pub parent: Option<CategoryRef>,
    pub subcategories: Vec<CategoryRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_distinguishes_absent_from_null() {
        let absent: UpdateCategoryRequest = serde_json::from_str(r#"{"name":"Shoes"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let cleared: UpdateCategoryRequest = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateCategoryRequest =
            serde_json::from_str(&format!(r#"{{"parent_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }
}
