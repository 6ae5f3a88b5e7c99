//! Book model

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::{
    document::{into_result, put, require, Fields},
    Record,
};

/// Book as submitted for creation.
///
/// Every catalogue field is required and must be truthy; any extra field
/// the client sends is stored alongside them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewBook {
    #[schema(value_type = Option<String>, example = "Dune")]
    pub titulo: Option<Value>,
    #[schema(value_type = Option<String>, example = "Frank Herbert")]
    pub autor: Option<Value>,
    #[schema(value_type = Option<i32>, example = 1965)]
    pub anio_publicacion: Option<Value>,
    #[schema(value_type = Option<String>, example = "scifi")]
    pub genero: Option<Value>,
    /// Cover image URL
    #[schema(value_type = Option<String>)]
    pub imagen: Option<Value>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Validate for NewBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "titulo", self.titulo.as_ref());
        require(&mut errors, "autor", self.autor.as_ref());
        require(&mut errors, "anio_publicacion", self.anio_publicacion.as_ref());
        require(&mut errors, "genero", self.genero.as_ref());
        require(&mut errors, "imagen", self.imagen.as_ref());
        into_result(errors)
    }
}

impl Record for NewBook {
    const COLLECTION: &'static str = "libros";
    const NOT_FOUND: &'static str = "Libro no encontrado";

    fn into_fields(self) -> Fields {
        let mut fields = self.extra;
        put(&mut fields, "titulo", self.titulo);
        put(&mut fields, "autor", self.autor);
        put(&mut fields, "anio_publicacion", self.anio_publicacion);
        put(&mut fields, "genero", self.genero);
        put(&mut fields, "imagen", self.imagen);
        fields
    }
}
