use entity::employees;
use platform_api::{ApiError, ApiResult};
use platform_db::EmployeeChanges;
use serde_json::{Map, Value};

const REQUIRED_FIELDS: [&str; 4] = ["id", "name", "role", "department"];

/// A validated create request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub department: String,
}

impl NewEmployee {
    /// Presence is checked for every field first, in the order `id, name, role, department`;
    /// value types are checked afterwards.
    pub fn from_json(body: &Value) -> ApiResult<Self> {
        let object = as_object(body)?;
        if let Some(missing) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| present(object, field).is_none())
        {
            return Err(ApiError::MissingField(missing));
        }

        Ok(Self {
            id: id_value(&object["id"])?,
            name: string_value(object, "name")?.unwrap_or_default(),
            role: string_value(object, "role")?.unwrap_or_default(),
            department: string_value(object, "department")?.unwrap_or_default(),
        })
    }
}

impl From<NewEmployee> for employees::Model {
    fn from(value: NewEmployee) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
            department: value.department,
        }
    }
}

/// Read the optional `name`, `role` and `department` of an update body. `id` is ignored.
pub fn changes_from_json(body: &Value) -> ApiResult<EmployeeChanges> {
    let object = as_object(body)?;
    Ok(EmployeeChanges {
        name: string_value(object, "name")?,
        role: string_value(object, "role")?,
        department: string_value(object, "department")?,
    })
}

/// Parse a path id. Ids are positive integers.
pub fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidField("id"))
}

fn as_object(body: &Value) -> ApiResult<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ApiError::InvalidBody("Request body must be a JSON object".into()))
}

// null is treated the same as an absent key
fn present<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

fn string_value(object: &Map<String, Value>, field: &'static str) -> ApiResult<Option<String>> {
    match present(object, field) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(ApiError::InvalidField(field)),
    }
}

fn id_value(value: &Value) -> ApiResult<i32> {
    value
        .as_i64()
        .filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or(ApiError::InvalidField("id"))
}
