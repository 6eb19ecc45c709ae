pub mod duty_events;
