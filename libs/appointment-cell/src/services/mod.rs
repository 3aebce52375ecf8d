pub mod availability;
pub mod lifecycle;
pub mod pricing;
pub mod recurrence;
pub mod reminders;
pub mod reschedule;
pub mod scheduler;
pub mod validation;

pub use availability::AvailabilityService;
pub use lifecycle::AppointmentLifecycleService;
pub use pricing::PricingService;
pub use recurrence::RecurrenceService;
pub use reminders::ReminderService;
pub use reschedule::RescheduleService;
pub use scheduler::AppointmentScheduler;
pub use validation::BookingValidationService;
