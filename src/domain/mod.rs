pub mod combat;
pub mod entity;
pub mod geom;
pub mod quest;
pub mod script;
