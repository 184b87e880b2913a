#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[cfg(test)]
mod test {
    use super::{Point, Rect};

    #[test]
    fn rect_contains_is_inclusive() {
        let rect = Rect::new(10.0, 10.0, 30.0, 30.0);

        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(40.0, 40.0)));
        assert!(rect.contains(Point::new(25.0, 25.0)));
        assert!(!rect.contains(Point::new(41.0, 25.0)));
        assert!(!rect.contains(Point::new(25.0, 9.0)));
    }

    #[test]
    fn center_and_distance() {
        let rect = Rect::new(0.0, 0.0, 80.0, 60.0);

        assert_eq!(Point::new(40.0, 30.0), rect.center());
        assert_eq!(5.0, Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)));
    }
}
