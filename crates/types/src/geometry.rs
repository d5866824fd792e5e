#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Scale both dimensions so the height matches `height`, keeping the
    /// aspect ratio. A degenerate source height falls back to the target
    /// height with unchanged width.
    pub fn scaled_to_height(self, height: f32) -> Size {
        if self.height <= 0.0 {
            return Size::new(self.width, height);
        }
        let scale = height / self.height;
        Size::new(self.width * scale, height)
    }

    /// Scale both dimensions so the width matches `width`, keeping the
    /// aspect ratio.
    pub fn scaled_to_width(self, width: f32) -> Size {
        if self.width <= 0.0 {
            return Size::new(width, self.height);
        }
        let scale = width / self.width;
        Size::new(width, self.height * scale)
    }

    pub fn aspect_ratio(self) -> f32 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn with_height(self, height: f32) -> Rect {
        Rect { height, ..self }
    }

    /// Grow the rectangle by `padding` on every side.
    pub fn inflated(self, padding: f32) -> Rect {
        Rect {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + padding * 2.0,
            height: self.height + padding * 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_preserves_aspect_ratio() {
        let portrait = Size::new(100.0, 200.0);
        let scaled = portrait.scaled_to_height(50.0);
        assert!((scaled.width - 25.0).abs() < 1e-4);
        assert!((scaled.aspect_ratio() - portrait.aspect_ratio()).abs() < 1e-4);
    }

    #[test]
    fn scaling_degenerate_height_does_not_blow_up() {
        let flat = Size::new(120.0, 0.0);
        let scaled = flat.scaled_to_height(40.0);
        assert_eq!(scaled.height, 40.0);
        assert_eq!(scaled.width, 120.0);
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.inflated(2.0), Rect::new(8.0, 18.0, 34.0, 44.0));
    }
}
