//! Loan ("préstamo") model

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::{
    document::{into_result, put, require, Fields},
    Record,
};

/// Loan as submitted for creation.
///
/// `libro_id` and `usuario_id` are plain references; nothing checks that
/// the book or the person exists.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewLoan {
    #[schema(value_type = Option<String>)]
    pub libro_id: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub usuario_id: Option<Value>,
    #[schema(value_type = Option<String>, example = "2024-05-01")]
    pub fecha_prestamo: Option<Value>,
    #[schema(value_type = Option<String>, example = "2024-05-15")]
    pub fecha_devolucion: Option<Value>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Validate for NewLoan {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "libro_id", self.libro_id.as_ref());
        require(&mut errors, "usuario_id", self.usuario_id.as_ref());
        require(&mut errors, "fecha_prestamo", self.fecha_prestamo.as_ref());
        require(&mut errors, "fecha_devolucion", self.fecha_devolucion.as_ref());
        into_result(errors)
    }
}

impl Record for NewLoan {
    const COLLECTION: &'static str = "prestamos";
    const NOT_FOUND: &'static str = "Préstamo no encontrado";

    fn into_fields(self) -> Fields {
        let mut fields = self.extra;
        put(&mut fields, "libro_id", self.libro_id);
        put(&mut fields, "usuario_id", self.usuario_id);
        put(&mut fields, "fecha_prestamo", self.fecha_prestamo);
        put(&mut fields, "fecha_devolucion", self.fecha_devolucion);
        fields
    }
}
