/// One detected object in original-frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    xmin: f32,
    ymin: f32,
    width: f32,
    height: f32,
    class_id: usize,
    confidence: f32,
}

impl Detection {
    pub fn new(
        xmin: f32,
        ymin: f32,
        width: f32,
        height: f32,
        class_id: usize,
        confidence: f32,
    ) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
            class_id,
            confidence,
        }
    }

    pub fn xmin(&self) -> f32 {
        self.xmin
    }

    pub fn ymin(&self) -> f32 {
        self.ymin
    }

    pub fn xmax(&self) -> f32 {
        self.xmin + self.width
    }

    pub fn ymax(&self) -> f32 {
        self.ymin + self.height
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn intersection_area(&self, other: &Detection) -> f32 {
        let l = self.xmin.max(other.xmin);
        let r = self.xmax().min(other.xmax());
        let t = self.ymin.max(other.ymin);
        let b = self.ymax().min(other.ymax());
        (r - l).max(0.) * (b - t).max(0.)
    }

    pub fn union_area(&self, other: &Detection) -> f32 {
        self.area() + other.area() - self.intersection_area(other)
    }

    pub fn iou(&self, other: &Detection) -> f32 {
        self.intersection_area(other) / self.union_area(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical_boxes() {
        let a = Detection::new(10.0, 10.0, 20.0, 20.0, 0, 0.9);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = Detection::new(0.0, 0.0, 10.0, 10.0, 0, 0.9);
        let b = Detection::new(100.0, 100.0, 10.0, 10.0, 0, 0.9);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        // [0,20]x[0,20] vs [10,30]x[0,20]: inter 200, union 600
        let a = Detection::new(0.0, 0.0, 20.0, 20.0, 0, 0.9);
        let b = Detection::new(10.0, 0.0, 20.0, 20.0, 1, 0.5);
        assert!((a.iou(&b) - 200.0 / 600.0).abs() < 1e-6);
    }
}
