use rand::Rng;
use survival_core::{GridView, Position};

/// Fixed obstacle mask the game is played on.
///
/// The mask never changes after construction. There is no connectivity
/// guarantee, so generated grids may contain unreachable pockets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates a grid without any obstacles.
    #[must_use]
    pub fn open(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; capacity],
        }
    }

    /// Creates a grid with obstacles on exactly the provided cells.
    ///
    /// Positions outside the grid are ignored.
    #[must_use]
    pub fn with_obstacles(width: u32, height: u32, obstacles: &[Position]) -> Self {
        let mut grid = Self::open(width, height);
        for position in obstacles {
            if let Some(index) = grid.index(*position) {
                grid.cells[index] = true;
            }
        }
        grid
    }

    /// Generates a grid by drawing each cell independently.
    ///
    /// Cells are visited `x`-major and every cell draws one integer in
    /// `0..obstacle_odds`; a draw of zero places an obstacle. An
    /// `obstacle_odds` of zero produces an open grid without consuming any
    /// randomness.
    pub fn generate<R>(width: u32, height: u32, obstacle_odds: u32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut grid = Self::open(width, height);
        if obstacle_odds == 0 {
            return grid;
        }

        for cell in grid.cells.iter_mut() {
            *cell = rng.gen_range(0..obstacle_odds) == 0;
        }
        grid
    }

    /// Number of cells along the first axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the second axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// True iff the position is in bounds and not an obstacle.
    #[must_use]
    pub fn is_valid_position(&self, position: Position) -> bool {
        self.view().is_valid_position(position)
    }

    /// Captures a read-only view of the obstacle mask.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.width, self.height)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.x() < self.width && position.y() < self.height {
            let x = usize::try_from(position.x()).ok()?;
            let y = usize::try_from(position.y()).ok()?;
            let height = usize::try_from(self.height).ok()?;
            Some(x * height + y)
        } else {
            None
        }
    }
}
