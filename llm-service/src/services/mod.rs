pub mod mock_service;
pub mod open_ai_service;
