pub mod brush;
pub mod change;
pub mod layer;
pub mod stack;
pub mod terrain;

pub use brush::PaintBrush;
pub use change::LiquidChange;
pub use layer::{LayerData, LiquidLayer};
pub use stack::{LiquidLayerStack, PaintOptions};
pub use terrain::{HeightGrid, NoiseTerrain, TerrainHeightProvider};
