pub mod person_directory_writer;
