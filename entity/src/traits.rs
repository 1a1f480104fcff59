use sea_orm::{DatabaseConnection, DbErr};

/// Trait for entities that are uniquely identified by a email address
///
/// most user facing endpoints, such as sign in or the admin user management
/// ones, receive a email instead of a id to identify the record to act upon.
pub trait QueryableByEmail {
    /// The model of the entity that is returned by the query
    type Model;

    fn find_by_email(
        email: &str,
        db: &DatabaseConnection,
    ) -> impl std::future::Future<Output = Result<Option<Self::Model>, DbErr>> + Send;
}
