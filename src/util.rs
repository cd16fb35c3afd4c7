pub fn indices_to_flags(indices: &[usize], len: usize) -> Vec<bool> {
  let mut flags = vec![false; len];
  indices.iter().for_each(|&i| flags[i] = true);
  flags
}

pub fn sparse_to_dense_data<T>(sparse: Vec<(usize, T)>, len: usize) -> Vec<Option<T>> {
  let mut dense = Vec::from_iter((0..len).map(|_| None));
  sparse.into_iter().for_each(|(i, t)| dense[i] = Some(t));
  dense
}
