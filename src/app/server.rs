/// OpenAPI documentation.
pub mod api;

/// Http specific DTOs.
pub mod dto;

/// Routes and middleware.
pub mod router;
