mod proximity_tree;
