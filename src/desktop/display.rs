//! Display enumeration and logical/physical coordinate mapping

use std::sync::Arc;

use super::platform::Backend;
use super::types::{DisplayInfo, Point, Rect};
use crate::error::{AutomationError, Result};

pub struct Display {
    backend: Arc<dyn Backend>,
}

impl Display {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn all(&self) -> Result<Vec<DisplayInfo>> {
        self.backend.displays()
    }

    pub fn primary(&self) -> Result<DisplayInfo> {
        self.backend.primary_display()
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    pub fn by_id(&self, id: &str) -> Result<DisplayInfo> {
        self.all()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AutomationError::DisplayNotFound(id.to_string()))
    }

    /// First display whose bounds contain the point (edges inclusive).
    /// Overlapping or shared edges resolve in declaration order.
    pub fn at_point(&self, x: i32, y: i32) -> Result<Option<DisplayInfo>> {
        let point = Point::new(x, y);
        Ok(self.all()?.into_iter().find(|d| d.bounds.contains(point)))
    }

    pub fn virtual_rect(&self) -> Result<Rect> {
        self.backend.virtual_screen_rect()
    }

    /// Logical to device pixels. Without an explicit display the owner is
    /// found on logical bounds, falling back to the primary display.
    pub fn to_physical(&self, point: Point, display: Option<&DisplayInfo>) -> Result<Point> {
        let owner = match display {
            Some(d) => d.clone(),
            None => match self.at_point(point.x, point.y)? {
                Some(d) => d,
                None => self.primary()?,
            },
        };
        Ok(map_about_origin(point, &owner, |offset| offset * owner.scale))
    }

    /// Device to logical pixels. Without an explicit display the owner is
    /// found on physical bounds, falling back to the primary display.
    pub fn from_physical(&self, point: Point, display: Option<&DisplayInfo>) -> Result<Point> {
        let owner = match display {
            Some(d) => d.clone(),
            None => {
                let found = self
                    .all()?
                    .into_iter()
                    .find(|d| d.physical_bounds().contains(point));
                match found {
                    Some(d) => d,
                    None => self.primary()?,
                }
            }
        };
        Ok(map_about_origin(point, &owner, |offset| offset / owner.scale))
    }
}

/// Apply `f` to the offset from the display origin, truncating toward zero.
fn map_about_origin(point: Point, display: &DisplayInfo, f: impl Fn(f64) -> f64) -> Point {
    let origin = display.bounds.origin();
    let rel = point - origin;
    Point::new(
        origin.x.saturating_add(f(f64::from(rel.x)) as i32),
        origin.y.saturating_add(f(f64::from(rel.y)) as i32),
    )
}
