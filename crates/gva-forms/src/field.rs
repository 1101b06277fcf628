use serde::{Deserialize, Serialize};

/// The four user-editable inputs of an entry form.
///
/// Serialized with the wire/UI field names (`orderId`, `fullName`, ...), which
/// is also the key used in `FormState::field_errors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    OrderId,
    FullName,
    Email,
    PhoneNumber,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 4] = [
        Field::OrderId,
        Field::FullName,
        Field::Email,
        Field::PhoneNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::OrderId => "orderId",
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_name_matches_as_str() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }
}
