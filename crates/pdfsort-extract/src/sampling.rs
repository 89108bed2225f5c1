/// Keep the first `ceil(n/2)` and last `floor(n/2)` pages; `n == 0` keeps all.
pub fn sample_pages<T>(mut pages: Vec<T>, n: usize) -> Vec<T> {
    if n == 0 || pages.len() <= n {
        return pages;
    }
    let front = n.div_ceil(2);
    let back = n / 2;
    let tail = pages.split_off(pages.len() - back);
    pages.truncate(front);
    pages.extend(tail);
    pages
}
