//! Identifier case conversion used to derive accessor names from property names.

/// Convert a property name to PascalCase.
/// e.g. "first_name" -> "FirstName", "userId" -> "UserId", "created-at" -> "CreatedAt"
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Default getter name for a property: "get" + PascalCase(name).
pub fn getter_name(property: &str) -> String {
    format!("get{}", to_pascal_case(property))
}

/// Default setter name for a property: "set" + PascalCase(name).
pub fn setter_name(property: &str) -> String {
    format!("set{}", to_pascal_case(property))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_from_snake_and_camel() {
        assert_eq!(to_pascal_case("first_name"), "FirstName");
        assert_eq!(to_pascal_case("userId"), "UserId");
        assert_eq!(to_pascal_case("id"), "Id");
        assert_eq!(to_pascal_case("created-at"), "CreatedAt");
    }

    #[test]
    fn accessor_names() {
        assert_eq!(getter_name("email_address"), "getEmailAddress");
        assert_eq!(setter_name("email_address"), "setEmailAddress");
    }
}
