mod disjoint_groups;
