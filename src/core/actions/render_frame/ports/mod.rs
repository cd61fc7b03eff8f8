pub mod render_backend;
