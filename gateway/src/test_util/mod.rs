pub mod mock_inference;
