use std::ops::{Index, IndexMut};

/// Square row-major grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    memory: Vec<T>,
    size: usize,
}

impl<T: Copy> Matrix<T> {
    #[inline(always)]
    pub fn filled(size: usize, value: T) -> Self {
        let memory = std::iter::repeat(value).take(size * size).collect();
        Self { memory, size }
    }

    #[inline(always)]
    pub fn fill(&mut self, value: T) {
        self.memory.iter_mut().for_each(|cell| *cell = value);
    }
}

impl<T> Matrix<T> {
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn row(&self, row: usize) -> &[T] {
        &self.memory[row * self.size..(row + 1) * self.size]
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.memory
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.memory
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.memory[index.0 * self.size + index.1]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.memory[index.0 * self.size + index.1]
    }
}
