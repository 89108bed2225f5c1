//! Spherical k-means: cosine similarity over L2-normalized vectors.

#[derive(Debug, Clone)]
pub struct Clustering {
    pub centroids: Vec<Vec<f32>>,
    pub assignments: Vec<usize>,
    pub iterations: usize,
}

impl Clustering {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &a in &self.assignments {
            sizes[a] += 1;
        }
        sizes
    }

    pub fn non_empty_clusters(&self) -> usize {
        self.cluster_sizes().into_iter().filter(|&s| s > 0).count()
    }
}

pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Index of the most similar centroid; ties go to the lowest index.
fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_sim = f32::NEG_INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let sim = dot(point, c);
        if sim > best_sim {
            best = i;
            best_sim = sim;
        }
    }
    best
}

/// Deterministic farthest-point seeding starting from the point closest to the corpus mean.
fn seed(points: &[Vec<f32>], k: usize) -> Vec<Vec<f32>> {
    let dim = points[0].len();
    let mut mean = vec![0f32; dim];
    for p in points {
        for (m, x) in mean.iter_mut().zip(p) {
            *m += x;
        }
    }
    normalize(&mut mean);

    let first = (0..points.len())
        .max_by(|&a, &b| dot(&points[a], &mean).total_cmp(&dot(&points[b], &mean)).then(b.cmp(&a)))
        .unwrap_or(0);
    let mut centroids = vec![points[first].clone()];
    // best similarity of each point to any chosen centroid
    let mut closest: Vec<f32> = points.iter().map(|p| dot(p, &centroids[0])).collect();

    while centroids.len() < k {
        let next = (0..points.len())
            .min_by(|&a, &b| closest[a].total_cmp(&closest[b]).then(a.cmp(&b)))
            .unwrap_or(0);
        let c = points[next].clone();
        for (i, p) in points.iter().enumerate() {
            closest[i] = closest[i].max(dot(p, &c));
        }
        centroids.push(c);
    }
    centroids
}

/// Cluster `points` into `k` groups. Inputs are normalized in place.
///
/// `k` is clamped to `1..=points.len()`. Empty clusters keep their previous centroid.
pub fn fit(points: &mut [Vec<f32>], k: usize, max_iterations: usize) -> Clustering {
    if points.is_empty() {
        return Clustering { centroids: Vec::new(), assignments: Vec::new(), iterations: 0 };
    }
    for p in points.iter_mut() {
        normalize(p);
    }
    let k = k.clamp(1, points.len());
    let mut centroids = seed(points, k);
    let mut assignments: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
    let dim = points[0].len();

    let mut iterations = 0;
    while iterations < max_iterations {
        iterations += 1;
        let mut sums = vec![vec![0f32; dim]; k];
        let mut counts = vec![0usize; k];
        for (p, &a) in points.iter().zip(&assignments) {
            counts[a] += 1;
            for (s, x) in sums[a].iter_mut().zip(p) {
                *s += x;
            }
        }
        for (i, mut sum) in sums.into_iter().enumerate() {
            if counts[i] > 0 {
                normalize(&mut sum);
                centroids[i] = sum;
            }
        }
        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }

    Clustering { centroids, assignments, iterations }
}
