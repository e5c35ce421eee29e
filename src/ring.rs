// ECG Sentinel — Fixed-Capacity Ring Buffer
//
// Overwrite-oldest storage shared by the baseline window and the RR buffer.
// All index arithmetic lives here.

#[derive(Debug, Clone)]
pub struct RingBuffer<T: Copy + Default, const N: usize> {
    buf: [T; N],
    head: usize, // next write position
    len: usize,
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        Self {
            buf: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    /// A full buffer where every slot holds `value`.
    pub fn filled(value: T) -> Self {
        Self {
            buf: [value; N],
            head: 0,
            len: N,
        }
    }

    /// Append `value`. Once full, the oldest element is overwritten and
    /// returned.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.len == N {
            Some(self.buf[self.head])
        } else {
            self.len += 1;
            None
        };
        self.buf[self.head] = value;
        self.head = (self.head + 1) % N;
        evicted
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Most recently pushed element.
    pub fn latest(&self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            Some(self.buf[(self.head + N - 1) % N])
        }
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.last(self.len)
    }

    /// Iterate the newest `k` elements, oldest first.
    pub fn last(&self, k: usize) -> impl Iterator<Item = T> + '_ {
        let k = k.min(self.len);
        let start = (self.head + N - k) % N;
        (0..k).map(move |i| self.buf[(start + i) % N])
    }

    pub fn clear(&mut self) {
        self.buf = [T::default(); N];
        self.head = 0;
        self.len = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fills_then_overwrites_oldest() {
        let mut ring: RingBuffer<u32, 3> = RingBuffer::new();
        assert!(ring.is_empty());
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert!(ring.is_full());
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(ring.latest(), Some(4));
    }

    #[test]
    fn last_k_is_chronological() {
        let mut ring: RingBuffer<u32, 4> = RingBuffer::new();
        for v in 1..=6 {
            ring.push(v);
        }
        assert_eq!(ring.last(2).collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(ring.last(10).collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn filled_reports_full() {
        let ring: RingBuffer<i32, 8> = RingBuffer::filled(7);
        assert!(ring.is_full());
        assert_eq!(ring.iter().sum::<i32>(), 56);
    }

    #[test]
    fn clear_empties() {
        let mut ring: RingBuffer<u32, 2> = RingBuffer::filled(9);
        ring.clear();
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.latest(), None);
        assert_eq!(ring.iter().count(), 0);
    }

    proptest! {
        #[test]
        fn keeps_exactly_the_newest_n(values in prop::collection::vec(any::<u32>(), 0..64)) {
            let mut ring: RingBuffer<u32, 5> = RingBuffer::new();
            for &v in &values {
                ring.push(v);
            }
            let start = values.len().saturating_sub(5);
            prop_assert_eq!(ring.iter().collect::<Vec<_>>(), values[start..].to_vec());
        }
    }
}
