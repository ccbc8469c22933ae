use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "code": 200, "message": message, "data": data }))
}

pub fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "code": 200, "message": message }))
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({ "code": 201, "message": message, "data": data }))
}

pub fn created_message(message: &str) -> HttpResponse {
    HttpResponse::Created().json(json!({ "code": 201, "message": message }))
}
