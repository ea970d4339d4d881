use super::attribute::Vertex;

/// An ordered tuple of vertices, normally a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    vertices: Vec<Vertex>,
}

impl Face {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    pub fn triangle(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self {
            vertices: vec![a, b, c],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub fn vertex_mut(&mut self, index: usize) -> Option<&mut Vertex> {
        self.vertices.get_mut(index)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}

impl From<Vec<Vertex>> for Face {
    fn from(vertices: Vec<Vertex>) -> Self {
        Self::new(vertices)
    }
}

impl From<[Vertex; 3]> for Face {
    fn from(vertices: [Vertex; 3]) -> Self {
        Self::new(vertices.into())
    }
}
