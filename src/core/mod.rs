// Inference-layer modules and shared errors/models
pub mod assembler {
    pub use crate::assembler::*;
}

pub mod encoders {
    pub use crate::encoders::*;
}

pub mod model {
    pub use crate::model::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod scaler {
    pub use crate::scaler::*;
}

pub mod errors {
    pub use crate::errors::*;
}
