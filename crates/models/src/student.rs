use sea_orm::{entity::prelude::*, ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub age: Option<i32>,
    pub address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A student as seen by the service and web layers.
///
/// `id` is `None` until the store assigns one on first save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<i32>,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub address: Option<String>,
}

impl Student {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into(), ..Self::default() }
    }

    /// Empty template backing the create form.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Persistence identity: same stored row. Unsaved students are never the same record.
    pub fn is_same_record(&self, other: &Student) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }

    /// Insert when `id` is absent, full overwrite of every column otherwise.
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(NotSet, Set),
            name: Set(self.name),
            email: Set(self.email),
            age: Set(self.age),
            address: Set(self.address),
        }
    }
}

impl From<Model> for Student {
    fn from(m: Model) -> Self {
        Self { id: Some(m.id), name: m.name, email: m.email, age: m.age, address: m.address }
    }
}
