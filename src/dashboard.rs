//! Screen selection and header texts shared by both dashboards.

use chrono::{DateTime, TimeZone, Timelike};

use crate::models::{Role, SessionIdentity};

pub const DOCTOR_ROUTE: &str = "/doctor-dashboard";
pub const PATIENT_ROUTE: &str = "/patient-dashboard";
pub const ROOT_ROUTE: &str = "/";

pub const WELCOME_TITLE: &str = "Welcome to HealthConnect Portal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    DoctorDashboard,
    PatientDashboard,
}

impl Screen {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Doctor => Screen::DoctorDashboard,
            Role::Patient => Screen::PatientDashboard,
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            Screen::SignIn => ROOT_ROUTE,
            Screen::DoctorDashboard => DOCTOR_ROUTE,
            Screen::PatientDashboard => PATIENT_ROUTE,
        }
    }
}

/// Which screen a visitor to `route` sees. Dashboards require the
/// matching role; anything unknown behaves like the root.
pub fn resolve_route(route: &str, identity: Option<&SessionIdentity>) -> Screen {
    let role = identity.map(SessionIdentity::role);
    match (route, role) {
        (DOCTOR_ROUTE, Some(Role::Doctor)) => Screen::DoctorDashboard,
        (PATIENT_ROUTE, Some(Role::Patient)) => Screen::PatientDashboard,
        (DOCTOR_ROUTE | PATIENT_ROUTE, _) => Screen::SignIn,
        (_, Some(role)) => Screen::for_role(role),
        (_, None) => Screen::SignIn,
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Header line: "Good morning, Dr. Sarah Wilson".
pub fn greeting_line<Tz: TimeZone>(now: &DateTime<Tz>, name: &str) -> String {
    format!("{}, {name}", greeting(now.hour()))
}

/// `HH:MM:SS`, 24-hour.
pub fn clock_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

/// "Friday, December 6, 2024".
pub fn clock_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d, %Y").to_string()
}
