/// A simple slab of reusable slots.
///
/// A `Slab` stores values of type `T` and hands out small indices
/// (tokens) that stay valid until the value is removed. Freed tokens are
/// reused by later insertions, so callers that can outlive a removal must
/// keep a second key to detect reuse.
pub(crate) struct Slab<T> {
    /// Slots; `None` marks a free slot.
    items: Vec<Option<T>>,

    /// Stack of free indices that can be reused.
    free: Vec<usize>,

    /// Number of occupied slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates a `Slab` with `size` free slots.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let slab = Slab::<i32>::new(16);
    /// ```
    pub(crate) fn new(size: usize) -> Self {
        let items = (0..size).map(|_| None).collect();
        let free = (0..size).rev().collect();

        Self {
            items,
            free,
            len: 0,
        }
    }

    /// Inserts a value and returns its token.
    ///
    /// A free slot is reused if there is one; otherwise the slab grows.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.items.push(None);
                self.items.len() - 1
            }
        };

        self.items[index] = Some(item);
        self.len += 1;

        index
    }

    /// Removes and returns the value stored at `index`.
    ///
    /// Returns `None` if the slot is out of range or already free.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;

        self.free.push(index);
        self.len -= 1;

        Some(item)
    }

    /// Removes the value at `index` only if `pred` accepts it.
    pub(crate) fn remove_if(&mut self, index: usize, pred: impl FnOnce(&T) -> bool) -> Option<T> {
        if pred(self.get(index)?) {
            self.remove(index)
        } else {
            None
        }
    }

    /// Returns a reference to the value at `index`, if occupied.
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)?.as_ref()
    }

    /// Returns the number of stored values.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no value is stored.
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes and returns every stored value.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.free.clear();
        self.len = 0;

        let items: Vec<T> = self.items.drain(..).flatten().collect();
        items
    }
}
