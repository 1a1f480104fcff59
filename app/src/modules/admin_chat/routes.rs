use super::dto::{Conversation, SendMessageDto};
use crate::{
    database::error::DbError,
    modules::{
        auth::middleware::{require_user, RequestUser, RoleLayer},
        common::{
            dto::{DeletedCountResponse, MessageResponse},
            extractors::{DbConnection, ValidatedJson},
            responses::{not_found, SimpleError},
        },
    },
    server::controller::AppState,
};
use axum::{
    extract::Path,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use entity::{
    chat_message,
    sea_orm_active_enums::{ChatMessageStatus, ChatSender},
    user,
};
use http::StatusCode;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin-chat/send", post(send_message))
        .route("/admin-chat/history/:user_id", get(chat_history))
        .route("/admin-chat/conversations", get(list_conversations))
        .route("/admin-chat/read/:user_id", put(mark_as_read))
        .route("/admin-chat/message/:message_id", delete(delete_chat_message))
        .route(
            "/admin-chat/conversation/:user_id",
            delete(delete_conversation),
        )
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(state, require_user))
}

/// messages exchanged between two users, in any direction
fn between(a: i32, b: i32) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(chat_message::Column::SenderId.eq(a))
                .add(chat_message::Column::ReceiverId.eq(b)),
        )
        .add(
            Condition::all()
                .add(chat_message::Column::SenderId.eq(b))
                .add(chat_message::Column::ReceiverId.eq(a)),
        )
}

/// groups the messages of a admin by the other participant, `messages` must be sorted
/// oldest first. counterparts without a user record are left out.
pub fn build_conversations(
    admin_id: i32,
    messages: Vec<chat_message::Model>,
    users: &HashMap<i32, user::Model>,
) -> Vec<Conversation> {
    let mut by_user: HashMap<i32, (chat_message::Model, u64)> = HashMap::new();

    for msg in messages {
        let counterpart = if msg.sender_id == admin_id {
            msg.receiver_id
        } else {
            msg.sender_id
        };

        let unread = msg.receiver_id == admin_id && msg.status == ChatMessageStatus::Sent;

        let entry = by_user.entry(counterpart).or_insert((msg.clone(), 0));

        entry.0 = msg;
        if unread {
            entry.1 += 1;
        }
    }

    let mut conversations: Vec<Conversation> = by_user
        .into_iter()
        .filter_map(|(user_id, (last_message, unread_count))| {
            let user = users.get(&user_id)?;

            Some(Conversation {
                user_id,
                user_name: user.display_name.clone(),
                user_email: user.email.clone(),
                timestamp: last_message.created_at,
                last_message,
                unread_count,
            })
        })
        .collect();

    conversations.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.last_message.id.cmp(&a.last_message.id))
    });

    conversations
}

/// Sends a message to a user
#[utoipa::path(
    post,
    path = "/api/admin-chat/send",
    tag = "admin-chat",
    security(("session_id" = []), ("bearer" = [])),
    request_body = SendMessageDto,
    responses(
        (status = CREATED, description = "the sent message", body = ChatMessage),
        (status = NOT_FOUND, description = "User not found", body = SimpleError),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn send_message(
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
    ValidatedJson(dto): ValidatedJson<SendMessageDto>,
) -> Result<(StatusCode, Json<chat_message::Model>), (StatusCode, SimpleError)> {
    user::Entity::find_by_id(dto.receiver_id)
        .one(&db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("User not found"))?;

    let sent = chat_message::ActiveModel {
        sender: Set(ChatSender::Admin),
        sender_id: Set(req_user.0.id),
        receiver_id: Set(dto.receiver_id),
        message: Set(dto.message),
        status: Set(ChatMessageStatus::Sent),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(sent)))
}

/// Messages between the request admin and a user, oldest first
#[utoipa::path(
    get,
    path = "/api/admin-chat/history/{user_id}",
    tag = "admin-chat",
    security(("session_id" = []), ("bearer" = [])),
    params(("user_id" = i32, Path, description = "id of the other participant")),
    responses(
        (status = OK, body = Vec<ChatMessage>),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn chat_history(
    Path(user_id): Path<i32>,
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
) -> Result<Json<Vec<chat_message::Model>>, (StatusCode, SimpleError)> {
    let messages = chat_message::Entity::find()
        .filter(between(req_user.0.id, user_id))
        .order_by_asc(chat_message::Column::CreatedAt)
        .order_by_asc(chat_message::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(messages))
}

/// Every conversation of the request admin, most recent first
#[utoipa::path(
    get,
    path = "/api/admin-chat/conversations",
    tag = "admin-chat",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<Conversation>),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn list_conversations(
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
) -> Result<Json<Vec<Conversation>>, (StatusCode, SimpleError)> {
    let admin_id = req_user.0.id;

    let messages = chat_message::Entity::find()
        .filter(
            Condition::any()
                .add(chat_message::Column::SenderId.eq(admin_id))
                .add(chat_message::Column::ReceiverId.eq(admin_id)),
        )
        .order_by_asc(chat_message::Column::CreatedAt)
        .order_by_asc(chat_message::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let mut counterparts: Vec<i32> = messages
        .iter()
        .map(|m| {
            if m.sender_id == admin_id {
                m.receiver_id
            } else {
                m.sender_id
            }
        })
        .collect();

    counterparts.sort_unstable();
    counterparts.dedup();

    let users: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(counterparts))
        .all(&db)
        .await
        .map_err(DbError::from)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(Json(build_conversations(admin_id, messages, &users)))
}

/// Marks every unread message sent by a user to the request admin as read
#[utoipa::path(
    put,
    path = "/api/admin-chat/read/{user_id}",
    tag = "admin-chat",
    security(("session_id" = []), ("bearer" = [])),
    params(("user_id" = i32, Path, description = "id of the other participant")),
    responses(
        (status = OK, body = MessageResponse),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn mark_as_read(
    Path(user_id): Path<i32>,
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    chat_message::Entity::update_many()
        .col_expr(
            chat_message::Column::Status,
            Expr::value(ChatMessageStatus::Read),
        )
        .filter(chat_message::Column::SenderId.eq(user_id))
        .filter(chat_message::Column::ReceiverId.eq(req_user.0.id))
        .filter(chat_message::Column::Status.eq(ChatMessageStatus::Sent))
        .exec(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("Messages marked as read")))
}

/// Deletes a message the request admin sent or received
#[utoipa::path(
    delete,
    path = "/api/admin-chat/message/{message_id}",
    tag = "admin-chat",
    security(("session_id" = []), ("bearer" = [])),
    params(("message_id" = i32, Path, description = "chat message id")),
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "Message not found", body = SimpleError),
        (
            status = FORBIDDEN,
            description = "Not authorized to delete this message",
            body = SimpleError,
        ),
    ),
)]
pub async fn delete_chat_message(
    Path(message_id): Path<i32>,
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = chat_message::Entity::find_by_id(message_id)
        .one(&db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("Message not found"))?;

    let admin_id = req_user.0.id;

    if found.sender_id != admin_id && found.receiver_id != admin_id {
        return Err((
            StatusCode::FORBIDDEN,
            SimpleError::from("Not authorized to delete this message"),
        ));
    }

    found.delete(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("Message deleted successfully")))
}

/// Deletes every message between the request admin and a user
#[utoipa::path(
    delete,
    path = "/api/admin-chat/conversation/{user_id}",
    tag = "admin-chat",
    security(("session_id" = []), ("bearer" = [])),
    params(("user_id" = i32, Path, description = "id of the other participant")),
    responses(
        (status = OK, body = DeletedCountResponse),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn delete_conversation(
    Path(user_id): Path<i32>,
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
) -> Result<Json<DeletedCountResponse>, (StatusCode, SimpleError)> {
    let res = chat_message::Entity::delete_many()
        .filter(between(req_user.0.id, user_id))
        .exec(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(DeletedCountResponse {
        message: String::from("Conversation deleted successfully"),
        deleted_count: res.rows_affected,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use entity::{sea_orm_active_enums::UserRole, user::CarPreferences};

    fn at(minutes: i64) -> chrono::DateTime<FixedOffset> {
        Utc.timestamp_opt(minutes * 60, 0).unwrap().into()
    }

    fn msg(id: i32, from: i32, to: i32, status: ChatMessageStatus, minute: i64) -> chat_message::Model {
        chat_message::Model {
            id,
            sender: if from == 1 { ChatSender::Admin } else { ChatSender::User },
            sender_id: from,
            receiver_id: to,
            message: format!("message {id}"),
            status,
            created_at: at(minute),
        }
    }

    fn user(id: i32, name: &str) -> user::Model {
        user::Model {
            id,
            google_id: None,
            email: format!("{}@example.com", name.to_lowercase()),
            password: None,
            display_name: String::from(name),
            first_name: String::from(name),
            last_name: String::new(),
            profile_photo: None,
            role: UserRole::User,
            phone_number: None,
            date_of_birth: None,
            language: String::from("English"),
            car_preferences: CarPreferences::default(),
            created_at: at(0),
            updated_at: at(0),
        }
    }

    #[test]
    fn groups_messages_by_counterpart() {
        let admin = 1;

        let messages = vec![
            msg(1, 2, admin, ChatMessageStatus::Read, 1),
            msg(2, admin, 2, ChatMessageStatus::Sent, 2),
            msg(3, 3, admin, ChatMessageStatus::Sent, 3),
            msg(4, 3, admin, ChatMessageStatus::Sent, 4),
            msg(5, 2, admin, ChatMessageStatus::Sent, 5),
            // user 4 was deleted
            msg(6, 4, admin, ChatMessageStatus::Sent, 6),
        ];

        let users = HashMap::from([(2, user(2, "Ana")), (3, user(3, "Bruno"))]);

        let conversations = build_conversations(admin, messages, &users);

        assert_eq!(conversations.len(), 2);

        assert_eq!(conversations[0].user_id, 2);
        assert_eq!(conversations[0].user_name, "Ana");
        assert_eq!(conversations[0].last_message.id, 5);
        // the message the admin sent does not count as unread
        assert_eq!(conversations[0].unread_count, 1);
        assert_eq!(conversations[0].timestamp, at(5));

        assert_eq!(conversations[1].user_id, 3);
        assert_eq!(conversations[1].user_email, "bruno@example.com");
        assert_eq!(conversations[1].unread_count, 2);
    }
}
