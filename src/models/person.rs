//! Person ("usuario" / "empleado") model

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::document::{error_with_message, into_result, put, require, Fields};

pub const DNI_LENGTH: usize = 8;
pub const DNI_LENGTH_MESSAGE: &str = "El DNI debe tener exactamente 8 caracteres";
pub const CREDENTIALS_MESSAGE: &str = "El email y la contraseña deben ser texto";

/// Person as submitted for creation.
///
/// `email` and `password` provision the authentication principal and are
/// never written to the person document.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewPerson {
    #[schema(value_type = Option<String>)]
    pub nombres: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub apellidos: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub telefono: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub direccion: Option<Value>,
    #[schema(value_type = Option<String>, example = "bibliotecario")]
    pub rol: Option<Value>,
    /// National id, exactly 8 characters
    #[schema(value_type = Option<String>, example = "12345678")]
    pub dni: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

/// Credentials for the authentication principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Fields persisted in the `usuarios` collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonRecord {
    pub nombres: Option<Value>,
    pub apellidos: Option<Value>,
    pub telefono: Option<Value>,
    pub direccion: Option<Value>,
    pub rol: Option<Value>,
    pub dni: Option<Value>,
}

impl PersonRecord {
    pub const COLLECTION: &'static str = "usuarios";
    pub const NOT_FOUND: &'static str = "Usuario no encontrado";

    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        put(&mut fields, "nombres", self.nombres);
        put(&mut fields, "apellidos", self.apellidos);
        put(&mut fields, "telefono", self.telefono);
        put(&mut fields, "direccion", self.direccion);
        put(&mut fields, "rol", self.rol);
        put(&mut fields, "dni", self.dni);
        fields
    }
}

/// Length as counted by the clients of this API (UTF-16 code units)
fn dni_length(dni: &Value) -> Option<usize> {
    dni.as_str().map(|s| s.encode_utf16().count())
}

impl Validate for NewPerson {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "nombres", self.nombres.as_ref());
        require(&mut errors, "apellidos", self.apellidos.as_ref());
        require(&mut errors, "telefono", self.telefono.as_ref());
        require(&mut errors, "direccion", self.direccion.as_ref());
        require(&mut errors, "rol", self.rol.as_ref());
        require(&mut errors, "dni", self.dni.as_ref());
        require(&mut errors, "email", self.email.as_ref());
        require(&mut errors, "password", self.password.as_ref());
        into_result(errors)?;

        let mut errors = ValidationErrors::new();
        if self.dni.as_ref().and_then(dni_length) != Some(DNI_LENGTH) {
            errors.add("dni", error_with_message("length", DNI_LENGTH_MESSAGE));
        }
        into_result(errors)?;

        let mut errors = ValidationErrors::new();
        if !self.email.as_ref().map(Value::is_string).unwrap_or(false) {
            errors.add("email", error_with_message("type", CREDENTIALS_MESSAGE));
        }
        if !self.password.as_ref().map(Value::is_string).unwrap_or(false) {
            errors.add("password", error_with_message("type", CREDENTIALS_MESSAGE));
        }
        into_result(errors)
    }
}

impl NewPerson {
    /// Split a validated person into principal credentials and stored fields
    pub fn split(self) -> Result<(Credentials, PersonRecord), ValidationErrors> {
        self.validate()?;

        let text = |value: Option<Value>| match value {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let credentials = Credentials {
            email: text(self.email),
            password: text(self.password),
        };
        let record = PersonRecord {
            nombres: self.nombres,
            apellidos: self.apellidos,
            telefono: self.telefono,
            direccion: self.direccion,
            rol: self.rol,
            dni: self.dni,
        };
        Ok((credentials, record))
    }
}
