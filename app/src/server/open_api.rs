use crate::modules::{
    admin_chat, ai, auth, booking, car, chatbot, common, contact, footer, user,
};
use crate::server::controller;
use axum::Router;
use entity::sea_orm_active_enums as enums;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::InfoBuilder;
use utoipa::{openapi::OpenApiBuilder, Modify, OpenApi};
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(
        entity::car::Model,
        entity::car::CarImage,
        entity::car::CarImages,
        entity::car::CarFeatures,
        entity::ai_prediction::Model,
        entity::ai_prediction::Defect,
        entity::ai_prediction::Defects,
        entity::ai_prediction::DefectType,
        entity::ai_prediction::DefectSeverity,
        entity::booking::Model,
        entity::message::Model,
        entity::chat_log::Model,
        entity::chat_message::Model,
        entity::footer::Model,
        entity::footer::SocialLinks,
        entity::user::CarPreferences,

        enums::CarStatus,
        enums::Fuel,
        enums::CarType,
        enums::Transmission,
        enums::DriveTrain,
        enums::CarCondition,
        enums::UserRole,
        enums::BookingStatus,
        enums::ChatSender,
        enums::ChatMessageStatus,
        enums::PredictionStatus,

        common::responses::ApiError,
        common::responses::SimpleError,
        common::dto::MessageResponse,
        common::dto::DeletedCountResponse,

        auth::dto::SignUp,
        auth::dto::SignIn,
        auth::dto::UserDto,
        auth::dto::SignUpResponse,
        auth::dto::SignInResponse,

        user::dto::UpdateUserRoleDto,
        user::dto::UpdateUserPasswordDto,
        user::dto::DeleteUserDto,
        user::dto::UpdateProfileDto,

        car::dto::CreateCarDto,
        car::dto::UpdateCarDto,
        car::dto::BulkDeleteCarsDto,
        car::dto::BulkDeleteCarsResponse,
        car::dto::MonthlySales,

        ai::dto::SmartSearchDto,
        ai::dto::NumberRange,
        ai::dto::SmartSearchFilters,
        ai::dto::SmartSearchResponse,
        ai::dto::PredictCarDto,
        ai::dto::PredictionResponse,
        ai::dto::AnalyzeImageDto,
        ai::dto::UpdatePredictionStatusDto,
        ai::dto::DemandAnalysis,
        ai::dto::ImageAnalysis,

        booking::dto::CreateBookingDto,
        booking::dto::UpdateBookingStatusDto,

        contact::dto::SubmitMessageDto,

        chatbot::dto::ChatDto,
        chatbot::dto::ChatReply,

        admin_chat::dto::SendMessageDto,
        admin_chat::dto::Conversation,

        footer::dto::UpdateFooterDto,
    )),
    paths(
        controller::healthcheck,

        user::routes::list_users,
        user::routes::sign_up,
        user::routes::sign_in,
        user::routes::sign_out,
        user::routes::current_user,
        user::routes::update_user_role,
        user::routes::update_user_password,
        user::routes::delete_user,
        user::routes::update_profile,

        auth::routes::google_sign_in,
        auth::routes::google_callback,
        auth::routes::profile,
        auth::routes::admin_panel,

        car::routes::list_cars,
        car::routes::list_sold_cars,
        car::routes::monthly_sales,
        car::routes::get_car,
        car::routes::create_car,
        car::routes::update_car,
        car::routes::delete_car,
        car::routes::bulk_delete_cars,
        car::routes::refresh_car_images,

        ai::routes::smart_search,
        ai::routes::predict_car,
        ai::routes::analyze_image,
        ai::routes::demand_predictions,
        ai::routes::image_analysis,
        ai::routes::update_prediction_status,

        booking::routes::create_booking,
        booking::routes::list_bookings,
        booking::routes::update_booking_status,
        booking::routes::delete_booking,

        contact::routes::submit_message,
        contact::routes::list_messages,
        contact::routes::delete_message,

        chatbot::routes::chat,
        chatbot::routes::list_chat_logs,
        chatbot::routes::clear_chat_logs,

        admin_chat::routes::send_message,
        admin_chat::routes::chat_history,
        admin_chat::routes::list_conversations,
        admin_chat::routes::mark_as_read,
        admin_chat::routes::delete_chat_message,
        admin_chat::routes::delete_conversation,

        footer::routes::get_footer,
        footer::routes::update_footer,
    ),
    modifiers(&SecuritySchemes),
)]
struct ApiDoc;

/// a user is authenticated either by the session id cookie or by a bearer JWT,
/// the cookie does not work on rapidoc or swagger UI for now, see:
///
/// https://github.com/swagger-api/swagger-js/issues/1163
struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_id",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "sid",
                    "session identifier",
                ))),
            );

            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn create_openapi_router() -> Router<controller::AppState> {
    let builder: OpenApiBuilder = ApiDoc::openapi().into();

    let info = InfoBuilder::new()
        .title("Dealership API")
        .description(Some(
            "Car dealership inventory, test drives, AI valuations and customer chat.",
        ))
        .version(env!("CARGO_PKG_VERSION"))
        .build();

    let api_doc = builder.info(info).build();

    Router::new()
        .merge(SwaggerUi::new("/swagger").url("/docs/openapi.json", api_doc))
        .merge(RapiDoc::new("/docs/openapi.json").path("/rapidoc"))
}
