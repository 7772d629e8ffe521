use super::element::Element;

/// An ordered, owned sequence of elements: one control-flow body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subqueue {
    elements: Vec<Element>,
}

impl Subqueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn insert(&mut self, index: usize, element: Element) {
        self.elements.insert(index, element);
    }

    pub fn remove(&mut self, index: usize) -> Element {
        self.elements.remove(index)
    }

    pub fn pop(&mut self) -> Option<Element> {
        self.elements.pop()
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.extend(elements);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Element> {
        self.elements.last_mut()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Element> {
        self.elements.iter_mut()
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// Visit every element of this queue and all nested queues, pre-order.
    pub fn walk(&self, visit: &mut dyn FnMut(&Element)) {
        for element in &self.elements {
            visit(element);
            for queue in element.subqueues() {
                queue.walk(visit);
            }
        }
    }

    /// Mutable pre-order traversal.
    ///
    /// The visitor sees an element before its nested queues.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        for element in &mut self.elements {
            visit(element);
            for queue in element.subqueues_mut() {
                queue.walk_mut(visit);
            }
        }
    }

    /// Number of elements including all nested ones.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

impl<'a> IntoIterator for &'a Subqueue {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl FromIterator<Element> for Subqueue {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
