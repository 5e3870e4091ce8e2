pub mod person_number;
