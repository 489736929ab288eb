/// Rejects empty and whitespace-only strings.
pub fn non_blank<T: AsRef<str> + ?Sized>(value: &T, _ctx: &()) -> garde::Result {
    if value.as_ref().trim().is_empty() {
        return Err(garde::Error::new("must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use garde::Validate;

    #[derive(Validate)]
    struct Probe {
        #[garde(custom(non_blank))]
        name: String,
    }

    #[test]
    fn blank_values_fail() {
        assert!(non_blank("", &()).is_err());
        assert!(non_blank("   \t", &()).is_err());
        assert!(non_blank("Ann", &()).is_ok());
    }

    #[test]
    fn usable_from_derive() {
        assert!(Probe { name: " ".into() }.validate().is_err());
        assert!(Probe { name: "Ann".into() }.validate().is_ok());
    }
}
