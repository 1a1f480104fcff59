use sea_orm::{ActiveValue, Value};

/// Sets a active model field only if the value is `Some`, leaving it untouched otherwise.
///
/// useful for partial updates where every field of the dto is optional, eg:
///
/// ```ignore
/// set_if_some(&mut car.color, dto.color);
/// ```
pub fn set_if_some<T>(field: &mut ActiveValue<T>, value: Option<T>)
where
    T: Into<Value>,
{
    if let Some(v) = value {
        *field = ActiveValue::Set(v);
    }
}

/// Same as `set_if_some` but for nullable columns, a `Some` value sets the column to `Some(v)`
pub fn set_nullable_if_some<T>(field: &mut ActiveValue<Option<T>>, value: Option<T>)
where
    Option<T>: Into<Value>,
{
    if let Some(v) = value {
        *field = ActiveValue::Set(Some(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sets_present_values() {
        let mut field: ActiveValue<String> = ActiveValue::NotSet;

        set_if_some(&mut field, None);
        assert!(field.is_not_set());

        set_if_some(&mut field, Some(String::from("Red")));
        assert_eq!(field, ActiveValue::Set(String::from("Red")));

        let mut nullable: ActiveValue<Option<i32>> = ActiveValue::Unchanged(None);

        set_nullable_if_some(&mut nullable, Some(4));
        assert_eq!(nullable, ActiveValue::Set(Some(4)));
    }
}
