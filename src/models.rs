use serde::Serialize;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_CANCELED: &str = "canceled";

pub const SESSION_USER: &str = "user";
pub const SESSION_ADMIN: &str = "admin";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub password_hash: String,
    pub is_serviceman: i64,
    pub is_blocked: i64,
    pub referral: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Public shape of an account: credential and bookkeeping fields stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub is_serviceman: bool,
    pub is_blocked: bool,
    pub referral: i64,
    pub created_at: String,
}

impl UserRow {
    pub fn into_view(self) -> UserView {
        UserView {
            id: self.id,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            is_serviceman: self.is_serviceman != 0,
            is_blocked: self.is_blocked != 0,
            referral: self.referral,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: String,
}

impl AdminRow {
    pub fn into_view(self) -> AdminView {
        AdminView {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: String,
    pub service_name: String,
    pub service_key: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub id: String,
    pub service_name: String,
    pub service_key: String,
    pub created_at: String,
    pub associated_servicemen: Vec<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: String,
    pub service_name: String,
    pub customer_id: String,
    pub serviceman_id: String,
    pub customer_name: String,
    pub address: String,
    pub contact_number: i64,
    pub note: Option<String>,
    pub price: i64,
    pub status: String,
    pub booked_at: String,
    pub appointment_date: String,
}

/// Wire shape of a booking. The lifecycle booleans are derived from the
/// single status column, so exactly one of pending/accepted/canceled holds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: String,
    pub service_name: String,
    pub associated_customer: String,
    pub associated_serviceman: String,
    pub customer_name: String,
    pub address: String,
    pub contact_number: i64,
    pub description: Option<String>,
    pub price: i64,
    pub is_pending: bool,
    pub is_accepted: bool,
    pub is_canceled: bool,
    pub is_active: bool,
    pub date_of_booking: String,
    pub date_of_appointment: String,
}

impl BookingRow {
    pub fn into_view(self) -> BookingView {
        let is_pending = self.status == STATUS_PENDING;
        let is_accepted = self.status == STATUS_ACCEPTED;
        let is_canceled = self.status == STATUS_CANCELED;
        BookingView {
            id: self.id,
            service_name: self.service_name,
            associated_customer: self.customer_id,
            associated_serviceman: self.serviceman_id,
            customer_name: self.customer_name,
            address: self.address,
            contact_number: self.contact_number,
            description: self.note,
            price: self.price,
            is_pending,
            is_accepted,
            is_canceled,
            is_active: is_pending || is_accepted,
            date_of_booking: self.booked_at,
            date_of_appointment: self.appointment_date,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub quality: String,
    pub recommend: i64,
    pub feedback: Option<String>,
    pub reviewer_id: String,
    pub serviceman_id: String,
    pub booking_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: String,
    pub quality: String,
    pub recommend: i64,
    pub feedback: Option<String>,
    pub reviewer_id: String,
    pub associated_serviceman: String,
    pub associated_job: String,
    pub created_at: String,
}

impl ReviewRow {
    pub fn into_view(self) -> ReviewView {
        ReviewView {
            id: self.id,
            quality: self.quality,
            recommend: self.recommend,
            feedback: self.feedback,
            reviewer_id: self.reviewer_id,
            associated_serviceman: self.serviceman_id,
            associated_job: self.booking_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PresenceRow {
    pub user_id: String,
    pub is_serviceman: i64,
    pub since: String,
}
