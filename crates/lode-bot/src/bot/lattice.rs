use lode_core::model::coord::Coord;

/// Radar placement points: a staggered diagonal lattice spanning the board.
/// Alternate bands shift by half the spacing so coverage diamonds interlock;
/// the home column never gets a point.
pub fn radar_lattice(width: i32, height: i32, spacing: i32) -> Vec<Coord> {
    let spacing = spacing.max(2);
    let mut points = Vec::new();
    let mut band = 0;
    let mut y = 0;
    while y < height {
        let offset = if band % 2 == 1 { spacing / 2 } else { 0 };
        let mut x = 1 + offset;
        while x < width {
            points.push(Coord::new(x, y));
            x += spacing;
        }
        y += spacing;
        band += 1;
    }
    points
}

/// Trap placement points: the full second column (ambushing the home lane)
/// plus every third interior row.
pub fn trap_lattice(width: i32, height: i32) -> Vec<Coord> {
    let mut points: Vec<Coord> = (0..height).map(|y| Coord::new(1, y)).collect();
    let mut y = 1;
    while y < height {
        for x in 2..(width - 1).max(2) {
            points.push(Coord::new(x, y));
        }
        y += 3;
    }
    points
}

/// Nearest point by squared Euclidean distance, skipping occupied ones; ties
/// fall to iteration order.
pub fn nearest_free_point<F>(points: &[Coord], origin: Coord, occupied: F) -> Option<Coord>
where
    F: Fn(Coord) -> bool,
{
    points
        .iter()
        .copied()
        .filter(|point| !occupied(*point))
        .min_by_key(|point| point.dist2(origin))
}
