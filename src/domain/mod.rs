// Domain layer: models and ports (collaborator interfaces) for the roll-call core.

pub mod model;
pub mod ports;
