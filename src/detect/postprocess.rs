use ndarray::{ArrayView2, Axis};
use std::cmp::Ordering;

use super::types::Detection;

const CXYWH_OFFSET: usize = 4;

/// Decode one YOLOv8 output tensor of shape `[4+nc, anchors]`.
///
/// Each anchor column is `cx, cy, w, h` in model-input pixels followed by
/// `nc` class scores. The best class wins; anchors below `conf_threshold`
/// are dropped; surviving boxes are scaled back by `ratio` into original
/// frame coordinates and clamped to the frame.
pub fn decode_predictions(
    preds: ArrayView2<f32>,
    ratio: f32,
    frame_w: f32,
    frame_h: f32,
    conf_threshold: f32,
) -> Vec<Detection> {
    let mut detections = Vec::new();
    if preds.nrows() <= CXYWH_OFFSET {
        return detections;
    }

    for anchor in preds.axis_iter(Axis(1)) {
        let scores = anchor.slice(ndarray::s![CXYWH_OFFSET..]);
        let best = scores
            .iter()
            .enumerate()
            .reduce(|max, x| if x.1 > max.1 { x } else { max });
        let (class_id, &confidence) = match best {
            Some(best) => best,
            None => continue,
        };
        if confidence < conf_threshold {
            continue;
        }

        let cx = anchor[0] / ratio;
        let cy = anchor[1] / ratio;
        let w = anchor[2] / ratio;
        let h = anchor[3] / ratio;
        let x = (cx - w / 2.).max(0.).min(frame_w);
        let y = (cy - h / 2.).max(0.).min(frame_h);

        detections.push(Detection::new(x, y, w, h, class_id, confidence));
    }

    detections
}

/// Greedy IoU suppression: sort by confidence, keep a box only when it does
/// not overlap an already-kept one beyond the threshold.
pub fn non_max_suppression(detections: &mut Vec<Detection>, iou_threshold: f32) {
    detections.sort_by(|a, b| {
        b.confidence()
            .partial_cmp(&a.confidence())
            .unwrap_or(Ordering::Equal)
    });

    let mut kept = 0;
    for index in 0..detections.len() {
        let mut drop = false;
        for prev in 0..kept {
            if detections[prev].iou(&detections[index]) > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            detections.swap(kept, index);
            kept += 1;
        }
    }
    detections.truncate(kept);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    // two-class model, one anchor column
    fn single_anchor(cx: f32, cy: f32, w: f32, h: f32, s0: f32, s1: f32) -> Array2<f32> {
        Array2::from_shape_vec((6, 1), vec![cx, cy, w, h, s0, s1]).unwrap()
    }

    #[test]
    fn test_decode_scales_back_to_frame_coordinates() {
        // 320x320 input fed from a 640x640 frame: ratio 0.5
        let preds = single_anchor(160.0, 160.0, 80.0, 40.0, 0.1, 0.9);
        let dets = decode_predictions(preds.view(), 0.5, 640.0, 640.0, 0.25);

        assert_eq!(dets.len(), 1);
        let d = &dets[0];
        assert_eq!(d.class_id(), 1);
        assert_eq!(d.confidence(), 0.9);
        assert_eq!(d.xmin(), 240.0);
        assert_eq!(d.ymin(), 280.0);
        assert_eq!(d.width(), 160.0);
        assert_eq!(d.height(), 80.0);
    }

    #[test]
    fn test_decode_drops_low_confidence() {
        let preds = single_anchor(10.0, 10.0, 4.0, 4.0, 0.1, 0.2);
        assert!(decode_predictions(preds.view(), 1.0, 100.0, 100.0, 0.25).is_empty());
    }

    #[test]
    fn test_decode_clamps_to_frame() {
        let preds = single_anchor(2.0, 2.0, 20.0, 20.0, 0.9, 0.1);
        let dets = decode_predictions(preds.view(), 1.0, 100.0, 100.0, 0.25);
        assert_eq!(dets[0].xmin(), 0.0);
        assert_eq!(dets[0].ymin(), 0.0);
    }

    #[test]
    fn test_nms_keeps_highest_of_overlapping_pair() {
        let mut dets = vec![
            Detection::new(0.0, 0.0, 20.0, 20.0, 0, 0.6),
            Detection::new(1.0, 1.0, 20.0, 20.0, 0, 0.9),
            Detection::new(200.0, 200.0, 20.0, 20.0, 1, 0.5),
        ];
        non_max_suppression(&mut dets, 0.45);

        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].confidence(), 0.9);
        assert_eq!(dets[1].class_id(), 1);
    }

    #[test]
    fn test_nms_keeps_all_disjoint_boxes() {
        let mut dets = vec![
            Detection::new(0.0, 0.0, 10.0, 10.0, 0, 0.5),
            Detection::new(50.0, 50.0, 10.0, 10.0, 0, 0.7),
        ];
        non_max_suppression(&mut dets, 0.45);
        assert_eq!(dets.len(), 2);
        // sorted by confidence
        assert_eq!(dets[0].confidence(), 0.7);
    }
}
